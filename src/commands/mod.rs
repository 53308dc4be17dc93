//! Command implementations behind the `pkgdeps` binary.
//!
//! Each command loads the JSON state file into an in-memory cluster, runs
//! the dependency engine against it and prints a short report.

pub mod config;
mod overrides;
mod reconcile;
mod resolve;
mod session;
mod state;
mod validate;

pub use overrides::overrides;
pub use reconcile::reconcile;
pub use resolve::resolve;
pub use session::InstallTarget;
pub use validate::validate;
