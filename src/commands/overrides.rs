use anyhow::Result;

use crate::{dependency::effective_constraints, runtime::Runtime};

use super::config::{Config, Settings};
use super::session::{InstallTarget, Session};

/// Print the constraint each dependency slot resolves with.
#[tracing::instrument(skip(runtime, settings))]
pub async fn overrides<R: Runtime>(
    runtime: R,
    settings: Settings,
    target: &InstallTarget,
) -> Result<()> {
    let config = Config::new(runtime, settings)?;
    for line in overrides_report(&config, target).await? {
        println!("{}", line);
    }
    Ok(())
}

pub(crate) async fn overrides_report<R: Runtime>(
    config: &Config<R>,
    target: &InstallTarget,
) -> Result<Vec<String>> {
    let session = Session::open(config, target).await?;
    let dependencies = &session.package.spec.dependencies;
    let overridden = session
        .handler(config)
        .compute_overrides(&session.install, dependencies)?;
    let effective = effective_constraints(&session.install, dependencies)?;

    Ok(effective
        .iter()
        .map(|(name, selection)| {
            let marker = if overridden.contains_key(name) {
                " (overridden)"
            } else {
                ""
            };
            format!("{} {}{}", name, display_constraints(&selection.constraints), marker)
        })
        .collect())
}

fn display_constraints(constraints: &str) -> &str {
    if constraints.trim().is_empty() {
        "*"
    } else {
        constraints
    }
}
