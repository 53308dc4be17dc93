//! Cluster object model.
//!
//! Plain serde types mirroring the package catalog and install objects
//! stored in the cluster. The engine only reads these, except for the
//! child installs it creates.

mod install;
mod package;
mod selection;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use install::{
    ClusterRef, Condition, DependenciesSpec, DependencyOverride, PackageInstall,
    PackageInstallSpec, PackageInstallStatus, SecretRef,
};
pub use package::{ConstraintSelection, Dependency, Package, PackageRef, PackageSpec};
pub use selection::{Prereleases, VersionSelection};

/// Identity and annotations shared by every cluster object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            annotations: BTreeMap::new(),
        }
    }

    /// Presence check; annotation values are not interpreted.
    pub fn has_annotation(&self, key: &str) -> bool {
        self.annotations.contains_key(key)
    }
}
