use anyhow::{Result, bail};

use crate::{runtime::Runtime, validation::validate_package};

use super::config::{Config, Settings};
use super::state::load_snapshot;

/// Check every package in the state file and report all problems.
#[tracing::instrument(skip(runtime, settings))]
pub fn validate<R: Runtime>(runtime: R, settings: Settings) -> Result<()> {
    let config = Config::new(runtime, settings)?;
    let (checked, problems) = validate_report(&config)?;
    for line in &problems {
        println!("{}", line);
    }
    if !problems.is_empty() {
        bail!("Found {} problems in {} packages", problems.len(), checked);
    }
    println!("{} packages are valid", checked);
    Ok(())
}

/// Number of packages checked and one line per problem found.
pub(crate) fn validate_report<R: Runtime>(config: &Config<R>) -> Result<(usize, Vec<String>)> {
    let snapshot = load_snapshot(&config.runtime, &config.state_path)?;
    let problems = snapshot
        .packages
        .iter()
        .flat_map(|package| {
            validate_package(package).into_iter().map(move |e| {
                format!(
                    "{}/{}: {}",
                    package.metadata.namespace, package.metadata.name, e
                )
            })
        })
        .collect();
    Ok((snapshot.packages.len(), problems))
}
