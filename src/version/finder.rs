//! Picks the best catalog package for a ref name and version selection.

use log::{debug, info};
use semver::Version;

use super::funnel::{AmbientVersionFilter, Candidate, Funnel, PrereleaseFilter, RangeFilter};
use super::range::{self, Range};
use crate::cluster::{ClusterFacts, PackageCatalog};
use crate::error::DependencyError;
use crate::model::{Package, PackageInstall, Prereleases, VersionSelection};

/// Install annotation that disables controller-version checks for its resolutions.
pub const IGNORE_CONTROLLER_VERSION_ANNOTATION: &str =
    "packaging.carvel.dev/ignore-kapp-controller-version-selection";

/// Install annotation that disables cluster-version checks for its resolutions.
pub const IGNORE_KUBERNETES_VERSION_ANNOTATION: &str =
    "packaging.carvel.dev/ignore-kubernetes-version-selection";

/// Version resolver over a package catalog.
///
/// Ambient versions are looked up only when some candidate actually
/// declares a constraint on them and the requester has not opted out.
pub struct PackageFinder<C: PackageCatalog, F: ClusterFacts> {
    catalog: C,
    facts: F,
}

impl<C: PackageCatalog, F: ClusterFacts> PackageFinder<C, F> {
    pub fn new(catalog: C, facts: F) -> Self {
        Self { catalog, facts }
    }

    /// Highest package named `ref_name` in the requester's namespace that
    /// satisfies `selection` and the compatibility checks.
    #[tracing::instrument(skip(self, requester, selection), fields(install = %requester.name(), constraints = %selection.constraints))]
    pub async fn find(
        &self,
        requester: &PackageInstall,
        ref_name: &str,
        selection: &VersionSelection,
    ) -> Result<Package, DependencyError> {
        let packages = self.catalog.list(requester.namespace()).await?;
        let matching: Vec<&Package> = packages
            .iter()
            .filter(|p| p.spec.ref_name == ref_name)
            .collect();
        if matching.is_empty() {
            return Err(DependencyError::NotFound {
                ref_name: ref_name.to_string(),
            });
        }

        let candidates: Vec<Candidate<'_>> = matching
            .into_iter()
            .filter_map(|p| match range::parse_relaxed(&p.spec.version) {
                Ok(version) => Some(Candidate {
                    version,
                    package: p,
                }),
                Err(e) => {
                    debug!(
                        "Skipping {} with unparsable version '{}': {}",
                        p.metadata.name, p.spec.version, e
                    );
                    None
                }
            })
            .collect();

        let selection = effective_selection(selection);
        let range = Range::parse(&selection.constraints).map_err(|e| {
            DependencyError::InvalidConstraint {
                constraint: selection.constraints.clone(),
                reason: e.to_string(),
            }
        })?;

        let controller = self.controller_version(requester, &candidates).await?;
        let cluster = self.cluster_version(requester, &candidates).await?;

        let funnel = Funnel::new()
            .stage(PrereleaseFilter::new(selection.prereleases.clone()))
            .stage(RangeFilter::new(range))
            .stage(AmbientVersionFilter::controller(controller))
            .stage(AmbientVersionFilter::cluster(cluster));

        let (survivors, report) = funnel.run(candidates);
        let selected = survivors
            .into_iter()
            .max_by(|a, b| range::precedence(&a.version, &b.version))
            .ok_or(DependencyError::ConstraintUnsatisfiable { report })?;

        debug!("Selected {} {}", ref_name, selected.version);
        Ok(selected.package.clone())
    }

    async fn controller_version(
        &self,
        requester: &PackageInstall,
        candidates: &[Candidate<'_>],
    ) -> Result<Option<Version>, DependencyError> {
        if !candidates
            .iter()
            .any(|c| c.package.controller_constraint().is_some())
        {
            return Ok(None);
        }
        if requester
            .metadata
            .has_annotation(IGNORE_CONTROLLER_VERSION_ANNOTATION)
        {
            info!("Found controller version override annotation; not applying version constraints");
            return Ok(None);
        }
        let version = self.facts.controller_version().await?;
        Ok(Some(range::release_only(version)))
    }

    async fn cluster_version(
        &self,
        requester: &PackageInstall,
        candidates: &[Candidate<'_>],
    ) -> Result<Option<Version>, DependencyError> {
        if !candidates
            .iter()
            .any(|c| c.package.kubernetes_constraint().is_some())
        {
            return Ok(None);
        }
        if requester
            .metadata
            .has_annotation(IGNORE_KUBERNETES_VERSION_ANNOTATION)
        {
            info!("Found kubernetes version override annotation; not applying version constraints");
            return Ok(None);
        }
        Ok(Some(self.facts.kubernetes_version(requester).await?))
    }
}

/// A range pinning one version admits prereleases without an explicit flag.
fn effective_selection(selection: &VersionSelection) -> VersionSelection {
    let mut selection = selection.clone();
    if selection.prereleases.is_none() && range::single_version(&selection.constraints).is_some()
    {
        selection.prereleases = Some(Prereleases::default());
    }
    selection
}
