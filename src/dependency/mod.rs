//! Dependency handling for package installs.
//!
//! Resolution combines a parent package's declared dependencies with the
//! install's overrides and looks each one up through the version finder.
//! Failures are collected so the caller sees every broken dependency at
//! once. Reconciliation then creates one pinned child install per resolved
//! dependency that is not installed yet, stopping at the first failure.

mod handler;
mod naming;
mod overrides;
mod reconciler;
mod resolver;

pub use handler::{DependencyHandler, EnsureOutcome};
pub use naming::{CHILD_NAME_PREFIX, NameGenerator};
pub use overrides::{compute_overrides, effective_constraints};
pub use reconciler::{OWNER_ANNOTATION, Reconciler};
pub use resolver::DependencyResolver;
