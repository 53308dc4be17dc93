//! The candidate funnel: an ordered list of filters, each narrowing the
//! candidate set, with the survivor count recorded after every stage.

use log::warn;
use semver::Version;

use super::range::Range;
use crate::error::FunnelReport;
use crate::model::{Package, Prereleases};

/// A catalog package paired with its parsed version.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub version: Version,
    pub package: &'a Package,
}

/// One stage of the funnel.
pub trait CandidateFilter: Send + Sync {
    /// Stage name used in diagnostics (`after-<name>=N`).
    fn name(&self) -> &'static str;

    fn satisfies(&self, candidate: &Candidate<'_>) -> bool;
}

/// Admits release versions always, prereleases only when allowed.
pub struct PrereleaseFilter {
    allowed: Option<Prereleases>,
}

impl PrereleaseFilter {
    pub fn new(allowed: Option<Prereleases>) -> Self {
        Self { allowed }
    }
}

impl CandidateFilter for PrereleaseFilter {
    fn name(&self) -> &'static str {
        "prereleases-filter"
    }

    fn satisfies(&self, candidate: &Candidate<'_>) -> bool {
        let pre = &candidate.version.pre;
        if pre.is_empty() {
            return true;
        }
        match &self.allowed {
            None => false,
            Some(p) if p.identifiers.is_empty() => true,
            // Numeric parts (`rc.1`) never name a prerelease channel.
            Some(p) => pre
                .as_str()
                .split('.')
                .filter(|ident| !ident.bytes().all(|b| b.is_ascii_digit()))
                .any(|ident| p.identifiers.iter().any(|allowed| allowed == ident)),
        }
    }
}

/// Admits versions inside the requested range.
pub struct RangeFilter {
    range: Range,
}

impl RangeFilter {
    pub fn new(range: Range) -> Self {
        Self { range }
    }
}

impl CandidateFilter for RangeFilter {
    fn name(&self) -> &'static str {
        "constraints-filter"
    }

    fn satisfies(&self, candidate: &Candidate<'_>) -> bool {
        self.range.matches(&candidate.version)
    }
}

/// Checks a candidate's own constraint on an ambient version (controller or cluster).
///
/// With no ambient version (bypassed, or never needed) every candidate passes,
/// as does every candidate that declares no constraint.
pub struct AmbientVersionFilter {
    name: &'static str,
    ambient: Option<Version>,
    constraint_of: fn(&Package) -> Option<&str>,
}

impl AmbientVersionFilter {
    pub fn controller(ambient: Option<Version>) -> Self {
        Self {
            name: "controller-version-check",
            ambient,
            constraint_of: Package::controller_constraint,
        }
    }

    pub fn cluster(ambient: Option<Version>) -> Self {
        Self {
            name: "cluster-version-check",
            ambient,
            constraint_of: Package::kubernetes_constraint,
        }
    }
}

impl CandidateFilter for AmbientVersionFilter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn satisfies(&self, candidate: &Candidate<'_>) -> bool {
        let Some(ambient) = &self.ambient else {
            return true;
        };
        let Some(constraints) = (self.constraint_of)(candidate.package) else {
            return true;
        };
        match Range::parse(constraints) {
            Ok(range) => range.matches(ambient),
            Err(e) => {
                warn!(
                    "Ignoring {} {}: unparsable constraint '{}': {}",
                    candidate.package.spec.ref_name, candidate.version, constraints, e
                );
                false
            }
        }
    }
}

/// Filters applied in insertion order.
#[derive(Default)]
pub struct Funnel {
    filters: Vec<Box<dyn CandidateFilter>>,
}

impl Funnel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, filter: impl CandidateFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Run every stage, even after the set empties, so the report is complete.
    pub fn run<'a>(&self, candidates: Vec<Candidate<'a>>) -> (Vec<Candidate<'a>>, FunnelReport) {
        let mut report = FunnelReport {
            all: candidates.len(),
            stages: Vec::with_capacity(self.filters.len()),
        };
        let mut survivors = candidates;
        for filter in &self.filters {
            survivors.retain(|c| filter.satisfies(c));
            report.stages.push((filter.name(), survivors.len()));
        }
        (survivors, report)
    }
}
