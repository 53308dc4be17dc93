//! Semver range expressions.
//!
//! Comparators separated by whitespace must all hold; `||` separates
//! alternatives. Comparison uses semver precedence, so build metadata is
//! ignored and `1.0.0-rc.1 < 1.0.0`.

use std::cmp::Ordering;
use std::fmt;

use semver::{BuildMetadata, Prerelease, Version};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RangeError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Comparator {
    op: Op,
    version: Version,
}

impl Comparator {
    fn matches(&self, v: &Version) -> bool {
        let ord = precedence(v, &self.version);
        match self.op {
            Op::Eq => ord == Ordering::Equal,
            Op::Ne => ord != Ordering::Equal,
            Op::Gt => ord == Ordering::Greater,
            Op::Ge => ord != Ordering::Less,
            Op::Lt => ord == Ordering::Less,
            Op::Le => ord != Ordering::Greater,
        }
    }
}

/// A parsed range: OR of AND-ed comparator sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    alternatives: Vec<Vec<Comparator>>,
}

impl Range {
    /// The range that admits every version.
    pub fn any() -> Self {
        Self {
            alternatives: vec![Vec::new()],
        }
    }

    pub fn parse(input: &str) -> Result<Self, RangeError> {
        if input.trim().is_empty() {
            return Ok(Self::any());
        }

        let mut alternatives = Vec::new();
        for part in input.split("||") {
            let tokens = join_operators(part)?;
            if tokens.is_empty() {
                return Err(RangeError(format!("empty alternative in '{}'", input)));
            }
            let mut set = Vec::new();
            for token in tokens {
                set.extend(parse_comparator(&token)?);
            }
            alternatives.push(set);
        }
        Ok(Self { alternatives })
    }

    pub fn matches(&self, v: &Version) -> bool {
        self.alternatives
            .iter()
            .any(|set| set.iter().all(|c| c.matches(v)))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .alternatives
            .iter()
            .map(|set| {
                set.iter()
                    .map(|c| format!("{}{}", op_str(c.op), c.version))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join(" || ");
        f.write_str(&text)
    }
}

fn op_str(op: Op) -> &'static str {
    match op {
        Op::Eq => "=",
        Op::Ne => "!=",
        Op::Gt => ">",
        Op::Ge => ">=",
        Op::Lt => "<",
        Op::Le => "<=",
    }
}

/// Split on whitespace, gluing a lone operator to the version after it (`>= 1.0.0`).
fn join_operators(part: &str) -> Result<Vec<String>, RangeError> {
    let mut tokens: Vec<String> = Vec::new();
    let mut pending: Option<&str> = None;
    for word in part.split_whitespace() {
        if let Some(op) = pending.take() {
            tokens.push(format!("{}{}", op, word));
        } else if word.chars().all(|c| matches!(c, '<' | '>' | '=' | '!')) {
            pending = Some(word);
        } else {
            tokens.push(word.to_string());
        }
    }
    if let Some(op) = pending {
        return Err(RangeError(format!("operator '{}' without a version", op)));
    }
    Ok(tokens)
}

fn split_op(token: &str) -> (Op, &str) {
    for (prefix, op) in [
        (">=", Op::Ge),
        ("<=", Op::Le),
        ("==", Op::Eq),
        ("!=", Op::Ne),
        (">", Op::Gt),
        ("<", Op::Lt),
        ("=", Op::Eq),
        ("!", Op::Ne),
    ] {
        if let Some(rest) = token.strip_prefix(prefix) {
            return (op, rest);
        }
    }
    (Op::Eq, token)
}

/// How much of a partial version was left open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wildcard {
    None,
    Patch,
    Minor,
    Major,
}

fn parse_comparator(token: &str) -> Result<Vec<Comparator>, RangeError> {
    let (op, rest) = split_op(token);
    let rest = rest.strip_prefix('v').unwrap_or(rest);
    let (base, wildcard) = parse_partial(rest)
        .map_err(|e| RangeError(format!("invalid version '{}': {}", rest, e)))?;

    let cmp = |op, version| Comparator { op, version };
    let bump = |n: u64| {
        n.checked_add(1)
            .ok_or_else(|| RangeError(format!("version '{}' is out of range", rest)))
    };
    let upper = match wildcard {
        Wildcard::None => return Ok(vec![cmp(op, base)]),
        Wildcard::Patch => Version::new(base.major, bump(base.minor)?, 0),
        Wildcard::Minor => Version::new(bump(base.major)?, 0, 0),
        Wildcard::Major => {
            return match op {
                Op::Eq | Op::Ge | Op::Le => Ok(Vec::new()),
                _ => Err(RangeError(format!("'{}' can never match", token))),
            };
        }
    };

    match op {
        Op::Eq => Ok(vec![cmp(Op::Ge, base), cmp(Op::Lt, upper)]),
        Op::Ge => Ok(vec![cmp(Op::Ge, base)]),
        Op::Gt => Ok(vec![cmp(Op::Ge, upper)]),
        Op::Lt => Ok(vec![cmp(Op::Lt, base)]),
        Op::Le => Ok(vec![cmp(Op::Lt, upper)]),
        Op::Ne => Err(RangeError(format!(
            "wildcards are not supported with '!=' in '{}'",
            token
        ))),
    }
}

fn is_wildcard(part: &str) -> bool {
    matches!(part, "x" | "X" | "*")
}

fn parse_partial(s: &str) -> Result<(Version, Wildcard), String> {
    if let Ok(v) = Version::parse(s) {
        return Ok((v, Wildcard::None));
    }

    let parts: Vec<&str> = s.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err("expected MAJOR.MINOR.PATCH".to_string());
    }

    let mut numbers = [0u64; 3];
    let mut wildcard = Wildcard::None;
    for i in 0..3 {
        let open = match parts.get(i) {
            None => true,
            Some(p) if is_wildcard(p) => true,
            Some(p) => {
                if wildcard != Wildcard::None {
                    return Err(format!("'{}' follows a wildcard", p));
                }
                numbers[i] = p
                    .parse()
                    .map_err(|_| format!("'{}' is not a number", p))?;
                false
            }
        };
        if open && wildcard == Wildcard::None {
            wildcard = match i {
                0 => Wildcard::Major,
                1 => Wildcard::Minor,
                _ => Wildcard::Patch,
            };
        }
    }

    if wildcard == Wildcard::None {
        // Three numeric parts that still failed the strict parse above.
        return Err("not a valid semantic version".to_string());
    }
    Ok((Version::new(numbers[0], numbers[1], numbers[2]), wildcard))
}

/// Parse a version, tolerating a leading `v`.
pub fn parse_relaxed(s: &str) -> Result<Version, semver::Error> {
    let s = s.trim();
    Version::parse(s.strip_prefix('v').unwrap_or(s))
}

/// The range pins exactly one concrete version (`1.2.3`, `v1.2.3-rc.1`).
pub fn single_version(s: &str) -> Option<Version> {
    parse_relaxed(s).ok()
}

/// Semver precedence: release fields, then prerelease; build metadata ignored.
pub fn precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

/// Drop prerelease and build metadata, keeping only the release triple.
pub fn release_only(mut v: Version) -> Version {
    v.pre = Prerelease::EMPTY;
    v.build = BuildMetadata::EMPTY;
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn matches(range: &str, version: &str) -> bool {
        Range::parse(range).unwrap().matches(&v(version))
    }

    #[test]
    fn test_empty_range_matches_everything() {
        assert!(matches("", "0.0.1"));
        assert!(matches("   ", "9.9.9-rc.1"));
    }

    #[test]
    fn test_bare_version_is_exact() {
        assert!(matches("1.0.0", "1.0.0"));
        assert!(!matches("1.0.0", "1.0.1"));
        assert!(matches("=1.0.0", "1.0.0"));
        assert!(matches("==1.0.0", "1.0.0"));
    }

    #[test]
    fn test_and_of_comparators() {
        assert!(matches(">=1.0.0 <3.0.0", "2.0.0"));
        assert!(matches(">=1.0.0 <3.0.0", "1.0.0"));
        assert!(!matches(">=1.0.0 <3.0.0", "3.0.0"));
    }

    #[test]
    fn test_or_of_sets() {
        let range = "<1.0.0 || >=2.0.0 <2.1.0";
        assert!(matches(range, "0.9.0"));
        assert!(matches(range, "2.0.5"));
        assert!(!matches(range, "1.5.0"));
        assert!(!matches(range, "2.1.0"));
    }

    #[test]
    fn test_operator_separated_by_space() {
        assert!(matches(">= 1.2.0 < 2.0.0", "1.9.0"));
        assert!(Range::parse(">=").is_err());
    }

    #[test]
    fn test_not_equal() {
        assert!(matches("!=1.0.0", "1.0.1"));
        assert!(!matches("!1.0.0", "1.0.0"));
    }

    #[test]
    fn test_wildcards() {
        assert!(matches("1.2.x", "1.2.9"));
        assert!(!matches("1.2.x", "1.3.0"));
        assert!(matches("1.x", "1.9.0"));
        assert!(!matches("1.x", "2.0.0"));
        assert!(matches(">1.2.x", "1.3.0"));
        assert!(!matches(">1.2.x", "1.2.9"));
        assert!(matches("<=1.2.x", "1.2.9"));
        assert!(!matches("<1.2.x", "1.2.0"));
        assert!(matches(">=1.2.*", "1.2.0"));
        assert!(matches("*", "5.0.0"));
        assert!(Range::parse("!=1.2.x").is_err());
    }

    #[test]
    fn test_build_metadata_ignored() {
        assert!(matches("1.0.0", "1.0.0+build.5"));
    }

    #[test]
    fn test_prerelease_ordering_in_ranges() {
        assert!(matches("<1.0.0", "1.0.0-rc.1"));
        assert!(matches(">1.0.0-alpha", "1.0.0-beta"));
        assert!(!matches(">=1.0.0", "1.0.0-rc.1"));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(Range::parse("my cat's breath smells like cat food").is_err());
        assert!(Range::parse(">=1.0.0 ||").is_err());
        assert!(Range::parse("1.x.3").is_err());
    }

    #[test]
    fn test_wildcard_at_numeric_limit_is_rejected() {
        assert!(Range::parse("1.18446744073709551615.x").is_err());
        assert!(Range::parse("18446744073709551615.x").is_err());
        assert!(Range::parse("<=18446744073709551615.x").is_err());
        assert!(Range::parse("1.18446744073709551614.x").is_ok());
    }

    #[test]
    fn test_single_version() {
        assert_eq!(single_version("1.0.0-rc.1"), Some(v("1.0.0-rc.1")));
        assert_eq!(single_version(" 2.0.0 "), Some(v("2.0.0")));
        assert_eq!(single_version("v0.1.0-rc.1"), Some(v("0.1.0-rc.1")));
        assert_eq!(single_version(">=1.0.0"), None);
        assert_eq!(single_version("1.0.0 <2.0.0"), None);
    }

    #[test]
    fn test_parse_relaxed_accepts_v_prefix() {
        assert_eq!(parse_relaxed("v1.2.3").unwrap(), v("1.2.3"));
        assert!(parse_relaxed("latest").is_err());
    }

    #[test]
    fn test_precedence() {
        assert_eq!(precedence(&v("1.0.0-rc.1"), &v("1.0.0")), Ordering::Less);
        assert_eq!(precedence(&v("1.0.0+a"), &v("1.0.0+b")), Ordering::Equal);
        assert_eq!(precedence(&v("1.10.0"), &v("1.9.0")), Ordering::Greater);
    }

    #[test]
    fn test_release_only() {
        assert_eq!(release_only(v("0.42.0-rc.1+abc")), v("0.42.0"));
    }

    #[test]
    fn test_display_roundtrips_meaning() {
        let range = Range::parse("1.2.x || >=3.0.0").unwrap();
        assert_eq!(range.to_string(), ">=1.2.0 <1.3.0 || >=3.0.0");
    }
}
