use anyhow::Result;
use log::{info, warn};

use crate::{dependency::EnsureOutcome, runtime::Runtime};

use super::config::{Config, Settings};
use super::session::{InstallTarget, Session};

/// Install the missing dependencies of an install into the state file.
#[tracing::instrument(skip(runtime, settings))]
pub async fn reconcile<R: Runtime>(
    runtime: R,
    settings: Settings,
    target: &InstallTarget,
) -> Result<()> {
    let config = Config::new(runtime, settings)?;
    for line in reconcile_report(&config, target).await? {
        println!("{}", line);
    }
    Ok(())
}

pub(crate) async fn reconcile_report<R: Runtime>(
    config: &Config<R>,
    target: &InstallTarget,
) -> Result<Vec<String>> {
    let session = Session::open(config, target).await?;
    let installs_before = session.cluster.snapshot()?.package_installs.len();
    let outcome = match session
        .handler(config)
        .ensure(&session.install, &session.package)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            // Children created before the failure exist; keep them on disk.
            if session.cluster.snapshot()?.package_installs.len() > installs_before {
                session.save(config)?;
                warn!(
                    "Saved packageinstalls created before the failure to {}",
                    config.state_path.display()
                );
            }
            return Err(e.into());
        }
    };

    match outcome {
        EnsureOutcome::Skipped => Ok(vec![format!(
            "Dependency installation is disabled for PackageInstall {}/{}",
            target.namespace, target.name
        )]),
        EnsureOutcome::Reconciled { resolved, created } => {
            if created.is_empty() {
                return Ok(vec![format!(
                    "All {} dependencies are already installed",
                    resolved.len()
                )]);
            }
            session.save(config)?;
            info!(
                "Saved {} new packageinstalls to {}",
                created.len(),
                config.state_path.display()
            );
            Ok(created
                .iter()
                .map(|i| {
                    let version = i
                        .spec
                        .package_ref
                        .as_ref()
                        .and_then(|r| r.version_selection.as_ref())
                        .map(|s| s.constraints.as_str())
                        .unwrap_or_default();
                    format!("Created packageinstall {} ({} {})", i.name(), i.ref_name(), version)
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterSnapshot;
    use crate::dependency::{NameGenerator, OWNER_ANNOTATION};
    use crate::model::{Dependency, Package};
    use crate::runtime::MockRuntime;
    use crate::test_utils::{
        NAME_SEED, NAMESPACE, STATE_PATH, install_for, installed, state_config_with,
    };
    use std::sync::{Arc, Mutex};

    fn snapshot(install_dependencies: bool) -> ClusterSnapshot {
        let mut install = install_for("parent-pkgi", "parent", "1.0.0");
        if install_dependencies {
            install = install.with_dependencies(vec![]);
        }
        ClusterSnapshot {
            packages: vec![
                Package::new(NAMESPACE, "parent", "1.0.0")
                    .with_dependency(Dependency::bound("dep-1", "child", ">=1.0.0")),
                Package::new(NAMESPACE, "child", "1.0.0"),
                Package::new(NAMESPACE, "child", "1.1.0"),
            ],
            package_installs: vec![install],
        }
    }

    /// Captures what the state file would be replaced with.
    fn capture_saves(runtime: &mut MockRuntime) -> Arc<Mutex<Option<String>>> {
        let saved = Arc::new(Mutex::new(None));
        let sink = saved.clone();
        runtime.expect_write().returning(move |_, contents| {
            *sink.lock().unwrap() = Some(String::from_utf8_lossy(contents).into_owned());
            Ok(())
        });
        runtime.expect_rename().returning(|_, _| Ok(()));
        saved
    }

    #[tokio::test]
    async fn test_reconcile_report_creates_and_saves() {
        let mut saved = None;
        let config = state_config_with(&snapshot(true), |runtime| {
            saved = Some(capture_saves(runtime));
        });
        let lines = reconcile_report(&config, &InstallTarget::new(NAMESPACE, "parent-pkgi"))
            .await
            .unwrap();

        let expected_name = NameGenerator::seeded(NAME_SEED).generate();
        assert_eq!(
            lines,
            vec![format!("Created packageinstall {} (child 1.1.0)", expected_name)]
        );

        let saved = saved.unwrap().lock().unwrap().clone().unwrap();
        let state: ClusterSnapshot = serde_json::from_str(&saved).unwrap();
        let child = state.find_install(NAMESPACE, &expected_name).unwrap();
        assert_eq!(
            child.metadata.annotations.get(OWNER_ANNOTATION).map(String::as_str),
            Some("PackageInstall/parent-pkgi")
        );
    }

    #[tokio::test]
    async fn test_reconcile_report_skips_when_disabled() {
        let config = state_config_with(&snapshot(false), |runtime| {
            runtime.expect_write().times(0);
        });
        let lines = reconcile_report(&config, &InstallTarget::new(NAMESPACE, "parent-pkgi"))
            .await
            .unwrap();
        assert_eq!(
            lines,
            vec!["Dependency installation is disabled for PackageInstall default/parent-pkgi"]
        );
    }

    #[tokio::test]
    async fn test_reconcile_report_does_not_save_when_satisfied() {
        let mut snapshot = snapshot(true);
        snapshot
            .package_installs
            .push(installed("existing-child", "child", "1.1.0"));

        let config = state_config_with(&snapshot, |runtime| {
            runtime.expect_write().times(0);
            runtime.expect_rename().times(0);
        });
        let lines = reconcile_report(&config, &InstallTarget::new(NAMESPACE, "parent-pkgi"))
            .await
            .unwrap();
        assert_eq!(lines, vec!["All 1 dependencies are already installed"]);
        assert_eq!(config.state_path.to_str(), Some(STATE_PATH));
    }

    #[tokio::test]
    async fn test_reconcile_report_saves_children_created_before_failure() {
        let names = NameGenerator::seeded(NAME_SEED);
        let first = names.generate();
        let taken = [names.generate(), names.generate()];

        let mut snapshot = snapshot(true);
        snapshot.packages[0] = Package::new(NAMESPACE, "parent", "1.0.0")
            .with_dependency(Dependency::bound("dep-1", "child", ">=1.0.0"))
            .with_dependency(Dependency::bound("dep-2", "extra", "0.3.0"));
        snapshot.packages.push(Package::new(NAMESPACE, "extra", "0.3.0"));
        for name in &taken {
            snapshot
                .package_installs
                .push(install_for(name, "unrelated", "1.0.0"));
        }

        let mut saved = None;
        let config = state_config_with(&snapshot, |runtime| {
            saved = Some(capture_saves(runtime));
        });
        let err = reconcile_report(&config, &InstallTarget::new(NAMESPACE, "parent-pkgi"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("extra.0.3.0"));

        let saved = saved.unwrap().lock().unwrap().clone().unwrap();
        let state: ClusterSnapshot = serde_json::from_str(&saved).unwrap();
        assert_eq!(state.package_installs.len(), 4);
        assert_eq!(state.find_install(NAMESPACE, &first).unwrap().ref_name(), "child");
    }
}
