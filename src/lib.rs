pub mod cluster;
pub mod commands;
pub mod dependency;
pub mod error;
pub mod model;
pub mod runtime;
pub mod validation;
pub mod version;

/// Fixtures shared by unit tests.
#[cfg(test)]
pub mod test_utils {
    use crate::cluster::ClusterSnapshot;
    use crate::commands::config::{Config, Settings};
    use crate::model::{PackageInstall, PackageRef, VersionSelection};
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    pub const NAMESPACE: &str = "default";
    pub const STATE_PATH: &str = "/work/pkgdeps.json";
    pub const NAME_SEED: u64 = 1;

    /// Install of `ref_name` in [`NAMESPACE`] with a service account and a
    /// default namespace, dependency installation off.
    pub fn install_for(name: &str, ref_name: &str, constraints: &str) -> PackageInstall {
        let mut install = PackageInstall::new(
            NAMESPACE,
            name,
            PackageRef::new(ref_name, VersionSelection::new(constraints)),
        );
        install.spec.service_account_name = "default-ns-sa".to_string();
        install.spec.default_namespace = "apps".to_string();
        install
    }

    /// Install that has converged on `version`.
    pub fn installed(name: &str, ref_name: &str, version: &str) -> PackageInstall {
        let mut install = install_for(name, ref_name, version);
        install.status.version = version.to_string();
        install
    }

    /// Config over a mock runtime serving `snapshot` from [`STATE_PATH`].
    pub fn state_config(snapshot: &ClusterSnapshot) -> Config<MockRuntime> {
        state_config_with(snapshot, |_| {})
    }

    /// Like [`state_config`], with extra expectations set by `configure`.
    pub fn state_config_with(
        snapshot: &ClusterSnapshot,
        configure: impl FnOnce(&mut MockRuntime),
    ) -> Config<MockRuntime> {
        let json = serde_json::to_string(snapshot).unwrap();
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .with(eq(PathBuf::from(STATE_PATH)))
            .returning(|_| true);
        runtime
            .expect_read_to_string()
            .with(eq(PathBuf::from(STATE_PATH)))
            .returning(move |_| Ok(json.clone()));
        runtime
            .expect_env_var()
            .returning(|_| Err(std::env::VarError::NotPresent));
        configure(&mut runtime);

        let settings = Settings {
            state: Some(PathBuf::from(STATE_PATH)),
            controller_version: Some("0.50.0".to_string()),
            kubernetes_version: Some("1.29.0".to_string()),
            seed: Some(NAME_SEED),
        };
        Config::new(runtime, settings).unwrap()
    }
}
