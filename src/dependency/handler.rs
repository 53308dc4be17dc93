use std::collections::BTreeMap;

use log::debug;

use super::naming::NameGenerator;
use super::overrides;
use super::reconciler::Reconciler;
use super::resolver::DependencyResolver;
use crate::cluster::{ClusterFacts, InstallStore, PackageCatalog};
use crate::error::DependencyError;
use crate::model::{Dependency, Package, PackageInstall, VersionSelection};
use crate::version::PackageFinder;

/// What `ensure` did for an install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The install does not ask for its dependencies to be installed.
    Skipped,
    Reconciled {
        resolved: Vec<Package>,
        created: Vec<PackageInstall>,
    },
}

/// Entry point for dependency handling of one install.
pub struct DependencyHandler<C, S, F>
where
    C: PackageCatalog,
    S: InstallStore,
    F: ClusterFacts,
{
    resolver: DependencyResolver<C, F>,
    reconciler: Reconciler<S>,
}

impl<C, S, F> DependencyHandler<C, S, F>
where
    C: PackageCatalog,
    S: InstallStore,
    F: ClusterFacts,
{
    pub fn new(catalog: C, store: S, facts: F, names: NameGenerator) -> Self {
        Self {
            resolver: DependencyResolver::new(PackageFinder::new(catalog, facts)),
            reconciler: Reconciler::new(store, names),
        }
    }

    /// Best package for each bound dependency of `package`, in declaration order.
    pub async fn resolve(
        &self,
        install: &PackageInstall,
        package: &Package,
    ) -> Result<Vec<Package>, DependencyError> {
        self.resolver.resolve(install, package).await
    }

    /// Creates a child install for every resolved dependency not yet installed.
    pub async fn reconcile(
        &self,
        install: &PackageInstall,
        dependencies: &[Package],
    ) -> Result<(), DependencyError> {
        self.reconciler.reconcile(install, dependencies).await?;
        Ok(())
    }

    pub fn compute_overrides(
        &self,
        install: &PackageInstall,
        dependencies: &[Dependency],
    ) -> Result<BTreeMap<String, VersionSelection>, DependencyError> {
        overrides::compute_overrides(install, dependencies)
    }

    /// Resolve then reconcile, when the install asks for its dependencies.
    #[tracing::instrument(skip_all, fields(install = %install.name()))]
    pub async fn ensure(
        &self,
        install: &PackageInstall,
        package: &Package,
    ) -> Result<EnsureOutcome, DependencyError> {
        if !install.installs_dependencies() {
            debug!("Dependency installation disabled for {}", install.name());
            return Ok(EnsureOutcome::Skipped);
        }
        let resolved = self.resolver.resolve(install, package).await?;
        let created = self.reconciler.reconcile(install, &resolved).await?;
        Ok(EnsureOutcome::Reconciled { resolved, created })
    }
}
