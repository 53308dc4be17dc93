use serde::{Deserialize, Serialize};

use super::{ObjectMeta, PackageRef};

/// Desired-state request to install one package, optionally with its dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInstall {
    pub metadata: ObjectMeta,
    pub spec: PackageInstallSpec,
    #[serde(default)]
    pub status: PackageInstallStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInstallSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_account_name: String,
    /// Target cluster; `None` means the cluster the controller runs in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_ref: Option<PackageRef>,
    /// Namespace used for rendered resources that do not name one.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<DependenciesSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig_secret_ref: Option<SecretRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependenciesSpec {
    /// Whether dependencies of the selected package get child installs.
    #[serde(default)]
    pub install: bool,
    #[serde(default, rename = "override", skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<DependencyOverride>,
}

/// Replacement selection for one named dependency slot of the parent package.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyOverride {
    pub name: String,
    pub package: PackageRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInstallStatus {
    /// Version the install has converged to; empty until first success.
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl PackageInstall {
    pub fn new(namespace: &str, name: &str, package_ref: PackageRef) -> Self {
        Self {
            metadata: ObjectMeta::new(name, namespace),
            spec: PackageInstallSpec {
                package_ref: Some(package_ref),
                ..Default::default()
            },
            status: PackageInstallStatus::default(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Ref name of the package this install asks for, or "" when unset.
    pub fn ref_name(&self) -> &str {
        self.spec
            .package_ref
            .as_ref()
            .map(|r| r.ref_name.as_str())
            .unwrap_or_default()
    }

    pub fn installs_dependencies(&self) -> bool {
        self.spec.dependencies.as_ref().is_some_and(|d| d.install)
    }

    pub fn overrides(&self) -> &[DependencyOverride] {
        self.spec
            .dependencies
            .as_ref()
            .map(|d| d.overrides.as_slice())
            .unwrap_or_default()
    }

    /// Enable dependency installation with the given overrides.
    pub fn with_dependencies(mut self, overrides: Vec<DependencyOverride>) -> Self {
        self.spec.dependencies = Some(DependenciesSpec {
            install: true,
            overrides,
        });
        self
    }
}

impl DependencyOverride {
    pub fn new(name: &str, package: PackageRef) -> Self {
        Self {
            name: name.to_string(),
            package,
        }
    }
}
