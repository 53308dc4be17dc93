//! Cluster-side collaborators.
//!
//! The engine never talks to cluster storage directly. It goes through these
//! traits, which keeps it testable with mocks and lets the CLI drive it from
//! a JSON snapshot.

mod facts;
mod memory;

use anyhow::Result;
use async_trait::async_trait;
use semver::Version;

use crate::error::CreateError;
use crate::model::{Package, PackageInstall};

pub use facts::StaticFacts;
pub use memory::{ClusterSnapshot, MemoryCluster};

/// Read-only view of the package catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageCatalog: Send + Sync {
    /// All packages in a namespace, every ref name and version.
    async fn list(&self, namespace: &str) -> Result<Vec<Package>>;
}

/// Install objects, listable and creatable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InstallStore: Send + Sync {
    async fn list(&self, namespace: &str) -> Result<Vec<PackageInstall>>;

    /// Create an install; a name already taken yields `CreateError::AlreadyExists`.
    async fn create(
        &self,
        namespace: &str,
        install: PackageInstall,
    ) -> Result<PackageInstall, CreateError>;
}

/// Ambient version facts consulted by package compatibility constraints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterFacts: Send + Sync {
    /// Version of the cluster the requesting install targets.
    ///
    /// The requester carries the service account and cluster reference used
    /// to reach that cluster.
    async fn kubernetes_version(&self, requester: &PackageInstall) -> Result<Version>;

    /// Version of the controller doing the resolution.
    async fn controller_version(&self) -> Result<Version>;
}
