use serde::{Deserialize, Serialize};

use super::{ObjectMeta, VersionSelection};

/// One version of a package in the catalog, keyed by (namespace, ref name, version).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub metadata: ObjectMeta,
    pub spec: PackageSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSpec {
    pub ref_name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    /// Controller versions this package can be installed by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_version_selection: Option<ConstraintSelection>,
    /// Cluster versions this package can be installed into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version_selection: Option<ConstraintSelection>,
}

/// A bare range on an ambient version (controller or cluster).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintSelection {
    #[serde(default)]
    pub constraints: String,
}

/// Named dependency slot. A slot without a package binding is a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRef {
    pub ref_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_selection: Option<VersionSelection>,
}

impl Package {
    /// Catalog object named `<ref>.<version>`, the usual naming convention.
    pub fn new(namespace: &str, ref_name: &str, version: &str) -> Self {
        Self {
            metadata: ObjectMeta::new(format!("{}.{}", ref_name, version), namespace),
            spec: PackageSpec {
                ref_name: ref_name.to_string(),
                version: version.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.spec.dependencies.push(dependency);
        self
    }

    pub fn with_controller_constraint(mut self, constraints: &str) -> Self {
        self.spec.controller_version_selection = Some(ConstraintSelection {
            constraints: constraints.to_string(),
        });
        self
    }

    pub fn with_kubernetes_constraint(mut self, constraints: &str) -> Self {
        self.spec.kubernetes_version_selection = Some(ConstraintSelection {
            constraints: constraints.to_string(),
        });
        self
    }

    pub fn controller_constraint(&self) -> Option<&str> {
        non_empty(self.spec.controller_version_selection.as_ref())
    }

    pub fn kubernetes_constraint(&self) -> Option<&str> {
        non_empty(self.spec.kubernetes_version_selection.as_ref())
    }
}

fn non_empty(selection: Option<&ConstraintSelection>) -> Option<&str> {
    selection
        .map(|s| s.constraints.as_str())
        .filter(|c| !c.trim().is_empty())
}

impl Dependency {
    /// Slot bound to `ref_name` with the given range.
    pub fn bound(name: &str, ref_name: &str, constraints: &str) -> Self {
        Self {
            name: name.to_string(),
            package: Some(PackageRef::new(ref_name, VersionSelection::new(constraints))),
        }
    }

    pub fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            package: None,
        }
    }
}

impl PackageRef {
    pub fn new(ref_name: &str, selection: VersionSelection) -> Self {
        Self {
            ref_name: ref_name.to_string(),
            version_selection: Some(selection),
        }
    }

    /// The selection to resolve with; a missing one matches any version.
    pub fn selection(&self) -> VersionSelection {
        self.version_selection.clone().unwrap_or_default()
    }
}
