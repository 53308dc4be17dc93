use anyhow::{Context, Result, bail};
use log::debug;
use std::path::Path;

use crate::{cluster::ClusterSnapshot, runtime::Runtime};

pub(crate) fn load_snapshot<R: Runtime>(runtime: &R, path: &Path) -> Result<ClusterSnapshot> {
    if !runtime.exists(path) {
        bail!("State file {} does not exist.", path.display());
    }
    let content = runtime.read_to_string(path)?;
    let snapshot: ClusterSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse state file {}", path.display()))?;
    debug!(
        "Loaded {} packages and {} packageinstalls from {}",
        snapshot.packages.len(),
        snapshot.package_installs.len(),
        path.display()
    );
    Ok(snapshot)
}

/// Writes through a temporary sibling so a failed write leaves the old state intact.
pub(crate) fn save_snapshot<R: Runtime>(
    runtime: &R,
    path: &Path,
    snapshot: &ClusterSnapshot,
) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    let tmp_path = path.with_extension("json.tmp");

    runtime.write(&tmp_path, json.as_bytes())?;
    if let Err(e) = runtime.rename(&tmp_path, path) {
        let _ = runtime.remove_file(&tmp_path);
        return Err(e);
    }
    debug!("Saved state to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Package;
    use crate::runtime::MockRuntime;
    use anyhow::anyhow;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    #[test]
    fn test_load_snapshot() {
        let path = PathBuf::from("/work/pkgdeps.json");
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .with(eq(path.clone()))
            .returning(|_| true);
        runtime
            .expect_read_to_string()
            .with(eq(path.clone()))
            .returning(|_| {
                Ok(r#"{"packages": [{"metadata": {"name": "a.1.0.0", "namespace": "default"},
                                     "spec": {"refName": "a", "version": "1.0.0"}}]}"#
                    .to_string())
            });

        let snapshot = load_snapshot(&runtime, &path).unwrap();
        assert_eq!(snapshot.packages, vec![Package::new("default", "a", "1.0.0")]);
        assert!(snapshot.package_installs.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        runtime.expect_read_to_string().times(0);

        let err = load_snapshot(&runtime, Path::new("/work/missing.json")).unwrap_err();
        assert_eq!(err.to_string(), "State file /work/missing.json does not exist.");
    }

    #[test]
    fn test_load_malformed_file() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("{not json".to_string()));

        let err = load_snapshot(&runtime, Path::new("/work/pkgdeps.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to parse state file"));
    }

    #[test]
    fn test_save_writes_then_renames() {
        let path = PathBuf::from("/work/pkgdeps.json");
        let tmp = PathBuf::from("/work/pkgdeps.json.tmp");
        let mut runtime = MockRuntime::new();
        runtime
            .expect_write()
            .withf(move |p, contents| {
                p == tmp.as_path() && String::from_utf8_lossy(contents).contains("\"packages\"")
            })
            .times(1)
            .returning(|_, _| Ok(()));
        runtime
            .expect_rename()
            .with(
                eq(PathBuf::from("/work/pkgdeps.json.tmp")),
                eq(path.clone()),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        save_snapshot(&runtime, &path, &ClusterSnapshot::default()).unwrap();
    }

    #[test]
    fn test_failed_rename_removes_temporary_file() {
        let mut runtime = MockRuntime::new();
        runtime.expect_write().returning(|_, _| Ok(()));
        runtime
            .expect_rename()
            .returning(|_, _| Err(anyhow!("read-only file system")));
        runtime
            .expect_remove_file()
            .with(eq(PathBuf::from("/work/pkgdeps.json.tmp")))
            .times(1)
            .returning(|_| Ok(()));

        let err = save_snapshot(
            &runtime,
            Path::new("/work/pkgdeps.json"),
            &ClusterSnapshot::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "read-only file system");
    }
}
