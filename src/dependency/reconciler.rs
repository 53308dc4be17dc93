use std::collections::BTreeMap;

use log::{debug, info, warn};

use super::naming::NameGenerator;
use crate::cluster::InstallStore;
use crate::error::{CreateError, DependencyError};
use crate::model::{
    ObjectMeta, Package, PackageInstall, PackageInstallSpec, PackageRef, VersionSelection,
};

/// Annotation naming the install a child was created for.
pub const OWNER_ANNOTATION: &str = "kapp-controller.carvel.dev/owner";
const OWNER_KIND_PREFIX: &str = "PackageInstall/";

/// Makes sure one child install exists per resolved dependency.
pub struct Reconciler<S: InstallStore> {
    store: S,
    names: NameGenerator,
}

impl<S: InstallStore> Reconciler<S> {
    pub fn new(store: S, names: NameGenerator) -> Self {
        Self { store, names }
    }

    /// Creates the missing child installs and returns them.
    ///
    /// Stops at the first creation failure; dependencies after it are left
    /// for the next pass.
    #[tracing::instrument(skip_all, fields(install = %parent.name()))]
    pub async fn reconcile(
        &self,
        parent: &PackageInstall,
        dependencies: &[Package],
    ) -> Result<Vec<PackageInstall>, DependencyError> {
        let mut created = Vec::new();
        for dependency in dependencies {
            let existing = self.store.list(parent.namespace()).await?;
            if existing.iter().any(|i| satisfies(i, dependency)) {
                debug!(
                    "Dependency {} {} already installed",
                    dependency.spec.ref_name, dependency.spec.version
                );
                continue;
            }

            let child = self.create_child(parent, dependency).await.map_err(|source| {
                DependencyError::Create {
                    package: dependency.metadata.name.clone(),
                    source,
                }
            })?;
            info!(
                "Created packageinstall {} for dependency {} {}",
                child.name(),
                dependency.spec.ref_name,
                dependency.spec.version
            );
            created.push(child);
        }
        Ok(created)
    }

    async fn create_child(
        &self,
        parent: &PackageInstall,
        dependency: &Package,
    ) -> Result<PackageInstall, CreateError> {
        let mut child = child_install(parent, dependency, self.names.generate());
        match self.store.create(parent.namespace(), child.clone()).await {
            Err(CreateError::AlreadyExists(name)) => {
                warn!("Packageinstall name {} already taken, retrying with a new name", name);
                child.metadata.name = self.names.generate();
                self.store.create(parent.namespace(), child).await
            }
            result => result,
        }
    }
}

/// Observed version only: an install still converging does not count.
fn satisfies(install: &PackageInstall, dependency: &Package) -> bool {
    install.ref_name() == dependency.spec.ref_name
        && install.status.version == dependency.spec.version
}

fn child_install(parent: &PackageInstall, dependency: &Package, name: String) -> PackageInstall {
    let mut metadata = ObjectMeta::new(name, parent.namespace());
    metadata.annotations = BTreeMap::from([(
        OWNER_ANNOTATION.to_string(),
        format!("{}{}", OWNER_KIND_PREFIX, parent.name()),
    )]);

    PackageInstall {
        metadata,
        spec: PackageInstallSpec {
            service_account_name: parent.spec.service_account_name.clone(),
            package_ref: Some(PackageRef::new(
                &dependency.spec.ref_name,
                VersionSelection::exact(&dependency.spec.version),
            )),
            default_namespace: parent.spec.default_namespace.clone(),
            ..Default::default()
        },
        status: Default::default(),
    }
}
