use anyhow::Result;
use log::debug;

use crate::runtime::Runtime;

use super::config::{Config, Settings};
use super::session::{InstallTarget, Session};

/// Print the package each dependency of an install resolves to.
#[tracing::instrument(skip(runtime, settings))]
pub async fn resolve<R: Runtime>(
    runtime: R,
    settings: Settings,
    target: &InstallTarget,
) -> Result<()> {
    let config = Config::new(runtime, settings)?;
    for line in resolve_report(&config, target).await? {
        println!("{}", line);
    }
    Ok(())
}

pub(crate) async fn resolve_report<R: Runtime>(
    config: &Config<R>,
    target: &InstallTarget,
) -> Result<Vec<String>> {
    let session = Session::open(config, target).await?;
    let resolved = session
        .handler(config)
        .resolve(&session.install, &session.package)
        .await?;
    debug!(
        "Resolved {} dependencies of {}",
        resolved.len(),
        session.package.metadata.name
    );
    Ok(resolved
        .iter()
        .map(|p| format!("{} {}", p.spec.ref_name, p.spec.version))
        .collect())
}
