use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::debug;
use semver::Version;

use super::ClusterFacts;
use crate::model::PackageInstall;

/// Facts answered from configured versions instead of a live cluster.
#[derive(Debug, Clone)]
pub struct StaticFacts {
    controller: Version,
    kubernetes: Option<Version>,
}

impl StaticFacts {
    pub fn new(controller: Version, kubernetes: Option<Version>) -> Self {
        Self {
            controller,
            kubernetes,
        }
    }
}

#[async_trait]
impl ClusterFacts for StaticFacts {
    async fn kubernetes_version(&self, requester: &PackageInstall) -> Result<Version> {
        debug!(
            "Kubernetes version requested for {}/{} (service account '{}')",
            requester.namespace(),
            requester.name(),
            requester.spec.service_account_name
        );
        self.kubernetes.clone().ok_or_else(|| {
            anyhow!(
                "Unable to get kubernetes version: no cluster version configured. Use --kubernetes-version or PKGDEPS_KUBERNETES_VERSION."
            )
        })
    }

    async fn controller_version(&self) -> Result<Version> {
        Ok(self.controller.clone())
    }
}
