use std::collections::BTreeMap;

use crate::error::DependencyError;
use crate::model::{Dependency, PackageInstall, VersionSelection};

/// Override selections of `install`, keyed by dependency name.
///
/// An override is legal only when the parent declares a bound dependency of
/// the same name with the same ref name. Every illegal override is reported
/// in a single error.
pub fn compute_overrides(
    install: &PackageInstall,
    dependencies: &[Dependency],
) -> Result<BTreeMap<String, VersionSelection>, DependencyError> {
    let declared: BTreeMap<&str, &str> = dependencies
        .iter()
        .filter_map(|d| {
            d.package
                .as_ref()
                .map(|p| (d.name.as_str(), p.ref_name.as_str()))
        })
        .collect();

    let mut overrides = BTreeMap::new();
    let mut invalid = Vec::new();
    for o in install.overrides() {
        match declared.get(o.name.as_str()) {
            Some(ref_name) if *ref_name == o.package.ref_name => {
                overrides.insert(o.name.clone(), o.package.selection());
            }
            _ => invalid.push(format!("{}/{}", o.name, o.package.ref_name)),
        }
    }

    if !invalid.is_empty() {
        return Err(DependencyError::InvalidOverride {
            overrides: invalid,
            package: install.ref_name().to_string(),
        });
    }
    Ok(overrides)
}

/// Selection each bound dependency resolves with: its own, unless overridden.
pub fn effective_constraints(
    install: &PackageInstall,
    dependencies: &[Dependency],
) -> Result<BTreeMap<String, VersionSelection>, DependencyError> {
    let mut effective: BTreeMap<String, VersionSelection> = dependencies
        .iter()
        .filter_map(|d| d.package.as_ref().map(|p| (d.name.clone(), p.selection())))
        .collect();
    effective.extend(compute_overrides(install, dependencies)?);
    Ok(effective)
}
