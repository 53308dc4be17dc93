use serde::{Deserialize, Serialize};

/// A semver range plus the prerelease policy used when matching it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSelection {
    /// Range expression such as `>=1.0.0 <2.0.0`; empty matches everything.
    #[serde(default)]
    pub constraints: String,
    /// `None` excludes prereleases unless the range pins a single prerelease.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prereleases: Option<Prereleases>,
}

/// Prerelease inclusion. An empty identifier list admits every prerelease.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prereleases {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<String>,
}

impl VersionSelection {
    pub fn new(constraints: impl Into<String>) -> Self {
        Self {
            constraints: constraints.into(),
            prereleases: None,
        }
    }

    /// Same range, every prerelease admitted.
    pub fn with_prereleases(mut self) -> Self {
        self.prereleases = Some(Prereleases::default());
        self
    }

    /// Exact pin on one version, as written on generated child installs.
    pub fn exact(version: impl Into<String>) -> Self {
        Self::new(version)
    }
}
