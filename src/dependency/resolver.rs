use log::{debug, warn};

use super::overrides::effective_constraints;
use crate::cluster::{ClusterFacts, PackageCatalog};
use crate::error::DependencyError;
use crate::model::{Package, PackageInstall};
use crate::version::PackageFinder;

/// Resolves every bound dependency of a package, or reports all that failed.
pub struct DependencyResolver<C: PackageCatalog, F: ClusterFacts> {
    finder: PackageFinder<C, F>,
}

impl<C: PackageCatalog, F: ClusterFacts> DependencyResolver<C, F> {
    pub fn new(finder: PackageFinder<C, F>) -> Self {
        Self { finder }
    }

    #[tracing::instrument(skip_all, fields(install = %install.name(), package = %package.metadata.name))]
    pub async fn resolve(
        &self,
        install: &PackageInstall,
        package: &Package,
    ) -> Result<Vec<Package>, DependencyError> {
        let effective = effective_constraints(install, &package.spec.dependencies)?;

        let mut resolved = Vec::new();
        let mut failures = Vec::new();
        for dependency in &package.spec.dependencies {
            let Some(package_ref) = &dependency.package else {
                debug!("Dependency {} has no package reference, skipping", dependency.name);
                continue;
            };
            let selection = effective
                .get(&dependency.name)
                .cloned()
                .unwrap_or_else(|| package_ref.selection());

            match self
                .finder
                .find(install, &package_ref.ref_name, &selection)
                .await
            {
                Ok(found) => resolved.push(found),
                Err(e) => {
                    warn!(
                        "Unable to resolve dependency {} ({}): {}",
                        dependency.name, package_ref.ref_name, e
                    );
                    failures.push(format!(
                        "{}/{} : {}",
                        package_ref.ref_name, selection.constraints, e
                    ));
                }
            }
        }

        if !failures.is_empty() {
            return Err(DependencyError::Resolution { failures });
        }
        Ok(resolved)
    }
}
