use anyhow::Result;
use clap::Parser;
use pkgdeps::commands::{self, InstallTarget, config::Settings};
use std::path::PathBuf;

/// pkgdeps - dependency resolver for package installs
///
/// Resolves the dependencies of a PackageInstall against a package catalog
/// and creates the missing child installs. The cluster is read from and
/// written to a JSON state file.
///
/// Versions may also be given through PKGDEPS_CONTROLLER_VERSION,
/// PKGDEPS_KUBERNETES_VERSION and PKGDEPS_NAME_SEED.
///
/// Examples:
///   pkgdeps --state cluster.json resolve my-app     # Show resolved dependencies
///   pkgdeps reconcile my-app -n apps                # Create missing child installs
#[derive(Parser, Debug)]
#[command(author, version = env!("PKGDEPS_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Cluster state file (defaults to ./pkgdeps.json; also via PKGDEPS_STATE)
    #[arg(
        long = "state",
        short = 's',
        env = "PKGDEPS_STATE",
        value_name = "PATH",
        global = true
    )]
    pub state: Option<PathBuf>,

    /// Version of the resolving controller (defaults to this build's version)
    #[arg(long = "controller-version", value_name = "VERSION", global = true)]
    pub controller_version: Option<String>,

    /// Version of the target cluster, needed by packages with cluster constraints
    #[arg(long = "kubernetes-version", value_name = "VERSION", global = true)]
    pub kubernetes_version: Option<String>,

    /// Seed for generated child install names
    #[arg(long = "seed", value_name = "N", global = true)]
    pub seed: Option<u64>,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            state: self.state.clone(),
            controller_version: self.controller_version.clone(),
            kubernetes_version: self.kubernetes_version.clone(),
            seed: self.seed,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Show the package each dependency of an install resolves to
    Resolve(TargetArgs),

    /// Show the constraint each dependency resolves with, after overrides
    Overrides(TargetArgs),

    /// Create child installs for dependencies that are not installed yet
    Reconcile(TargetArgs),

    /// Check every package in the state file
    Validate,
}

#[derive(clap::Args, Debug)]
pub struct TargetArgs {
    /// Name of the PackageInstall
    #[arg(value_name = "INSTALL")]
    pub install: String,

    /// Namespace of the PackageInstall
    #[arg(long = "namespace", short = 'n', default_value = "default")]
    pub namespace: String,
}

impl TargetArgs {
    fn target(&self) -> InstallTarget {
        InstallTarget::new(&self.namespace, &self.install)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = pkgdeps::runtime::RealRuntime;
    let settings = cli.settings();

    match cli.command {
        Commands::Resolve(args) => commands::resolve(runtime, settings, &args.target()).await?,
        Commands::Overrides(args) => {
            commands::overrides(runtime, settings, &args.target()).await?
        }
        Commands::Reconcile(args) => {
            commands::reconcile(runtime, settings, &args.target()).await?
        }
        Commands::Validate => commands::validate(runtime, settings)?,
    }
    Ok(())
}
