use anyhow::{Context, Result};
use log::debug;
use semver::Version;
use std::path::PathBuf;

use crate::{
    cluster::StaticFacts, dependency::NameGenerator, runtime::Runtime, version::range,
};

pub const CONTROLLER_VERSION_ENV: &str = "PKGDEPS_CONTROLLER_VERSION";
pub const KUBERNETES_VERSION_ENV: &str = "PKGDEPS_KUBERNETES_VERSION";
pub const NAME_SEED_ENV: &str = "PKGDEPS_NAME_SEED";

pub const DEFAULT_STATE_FILE: &str = "pkgdeps.json";

/// Settings given on the command line. Unset values fall back to the
/// environment, then to defaults.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub state: Option<PathBuf>,
    pub controller_version: Option<String>,
    pub kubernetes_version: Option<String>,
    pub seed: Option<u64>,
}

pub struct Config<R: Runtime> {
    pub runtime: R,
    pub state_path: PathBuf,
    pub controller_version: Version,
    pub kubernetes_version: Option<Version>,
    pub name_seed: Option<u64>,
}

impl<R: Runtime> Config<R> {
    pub fn new(runtime: R, settings: Settings) -> Result<Self> {
        let state_path = settings
            .state
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));

        let controller_version = match settings
            .controller_version
            .or_else(|| runtime.env_var(CONTROLLER_VERSION_ENV).ok())
        {
            Some(v) => parse_version(&v, "controller")?,
            None => build_version(),
        };

        let kubernetes_version = settings
            .kubernetes_version
            .or_else(|| runtime.env_var(KUBERNETES_VERSION_ENV).ok())
            .map(|v| parse_version(&v, "kubernetes"))
            .transpose()?;

        let name_seed = match settings.seed {
            Some(seed) => Some(seed),
            None => runtime
                .env_var(NAME_SEED_ENV)
                .ok()
                .map(|s| {
                    s.trim()
                        .parse::<u64>()
                        .with_context(|| format!("Invalid {}: '{}'", NAME_SEED_ENV, s))
                })
                .transpose()?,
        };

        debug!(
            "Using state file {:?}, controller version {}, kubernetes version {:?}",
            state_path, controller_version, kubernetes_version
        );

        Ok(Self {
            runtime,
            state_path,
            controller_version,
            kubernetes_version,
            name_seed,
        })
    }

    pub fn facts(&self) -> StaticFacts {
        StaticFacts::new(
            self.controller_version.clone(),
            self.kubernetes_version.clone(),
        )
    }

    pub fn name_generator(&self) -> NameGenerator {
        match self.name_seed {
            Some(seed) => NameGenerator::seeded(seed),
            None => NameGenerator::from_entropy(),
        }
    }
}

fn parse_version(value: &str, what: &str) -> Result<Version> {
    range::parse_relaxed(value.trim())
        .with_context(|| format!("Invalid {} version '{}'", what, value))
}

/// Version this binary was built as, used when no controller version is given.
fn build_version() -> Version {
    range::parse_relaxed(env!("PKGDEPS_VERSION"))
        .or_else(|_| Version::parse(env!("CARGO_PKG_VERSION")))
        .unwrap_or_else(|_| Version::new(0, 0, 0))
}
