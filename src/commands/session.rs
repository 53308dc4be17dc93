use anyhow::{Context, Result};
use log::debug;

use crate::{
    cluster::{MemoryCluster, StaticFacts},
    dependency::DependencyHandler,
    model::{Package, PackageInstall},
    runtime::Runtime,
    version::PackageFinder,
};

use super::config::Config;
use super::state::{load_snapshot, save_snapshot};

/// An install addressed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub namespace: String,
    pub name: String,
}

impl InstallTarget {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

/// State file loaded into an in-memory cluster, plus the targeted install
/// and the package it currently resolves to.
pub(crate) struct Session {
    pub cluster: MemoryCluster,
    pub install: PackageInstall,
    pub package: Package,
}

impl Session {
    #[tracing::instrument(skip(config))]
    pub async fn open<R: Runtime>(config: &Config<R>, target: &InstallTarget) -> Result<Self> {
        let snapshot = load_snapshot(&config.runtime, &config.state_path)?;
        let install = snapshot
            .find_install(&target.namespace, &target.name)
            .cloned()
            .with_context(|| {
                format!(
                    "PackageInstall {}/{} not found in {}",
                    target.namespace,
                    target.name,
                    config.state_path.display()
                )
            })?;
        let package_ref = install.spec.package_ref.clone().with_context(|| {
            format!(
                "PackageInstall {}/{} has no package reference",
                target.namespace, target.name
            )
        })?;

        let cluster = MemoryCluster::new(snapshot);
        let finder = PackageFinder::new(cluster.clone(), config.facts());
        let package = finder
            .find(&install, &package_ref.ref_name, &package_ref.selection())
            .await
            .with_context(|| {
                format!(
                    "Unable to resolve the package of PackageInstall {}/{}",
                    target.namespace, target.name
                )
            })?;
        debug!(
            "PackageInstall {}/{} resolves to {}",
            target.namespace, target.name, package.metadata.name
        );

        Ok(Self {
            cluster,
            install,
            package,
        })
    }

    pub fn handler<R: Runtime>(
        &self,
        config: &Config<R>,
    ) -> DependencyHandler<MemoryCluster, MemoryCluster, StaticFacts> {
        DependencyHandler::new(
            self.cluster.clone(),
            self.cluster.clone(),
            config.facts(),
            config.name_generator(),
        )
    }

    pub fn save<R: Runtime>(&self, config: &Config<R>) -> Result<()> {
        save_snapshot(&config.runtime, &config.state_path, &self.cluster.snapshot()?)
    }
}
