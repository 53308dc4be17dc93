//! In-process cluster backed by a snapshot of packages and installs.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{InstallStore, PackageCatalog};
use crate::error::CreateError;
use crate::model::{Package, PackageInstall};

/// Everything the engine can see of a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSnapshot {
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub package_installs: Vec<PackageInstall>,
}

impl ClusterSnapshot {
    pub fn find_install(&self, namespace: &str, name: &str) -> Option<&PackageInstall> {
        self.package_installs
            .iter()
            .find(|i| i.namespace() == namespace && i.name() == name)
    }
}

/// Shared, mutable cluster. Clones see the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryCluster {
    inner: Arc<Mutex<ClusterSnapshot>>,
}

impl MemoryCluster {
    pub fn new(snapshot: ClusterSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(snapshot)),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Result<ClusterSnapshot> {
        Ok(self.lock()?.clone())
    }

    pub fn add_package(&self, package: Package) -> Result<()> {
        self.lock()?.packages.push(package);
        Ok(())
    }

    /// Insert or replace an install by (namespace, name).
    pub fn put_install(&self, install: PackageInstall) -> Result<()> {
        let mut state = self.lock()?;
        state
            .package_installs
            .retain(|i| !(i.namespace() == install.namespace() && i.name() == install.name()));
        state.package_installs.push(install);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ClusterSnapshot>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("cluster state lock poisoned"))
    }
}

#[async_trait]
impl PackageCatalog for MemoryCluster {
    async fn list(&self, namespace: &str) -> Result<Vec<Package>> {
        Ok(self
            .lock()?
            .packages
            .iter()
            .filter(|p| p.metadata.namespace == namespace)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InstallStore for MemoryCluster {
    async fn list(&self, namespace: &str) -> Result<Vec<PackageInstall>> {
        Ok(self
            .lock()?
            .package_installs
            .iter()
            .filter(|i| i.namespace() == namespace)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        namespace: &str,
        mut install: PackageInstall,
    ) -> Result<PackageInstall, CreateError> {
        let mut state = self.lock()?;
        if state.find_install(namespace, install.name()).is_some() {
            return Err(CreateError::AlreadyExists(install.metadata.name));
        }
        install.metadata.namespace = namespace.to_string();
        debug!("Created packageinstall {}/{}", namespace, install.name());
        state.package_installs.push(install.clone());
        Ok(install)
    }
}
