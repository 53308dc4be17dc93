//! Error taxonomy for dependency resolution and reconciliation.
//!
//! The `Display` texts are part of the observable contract: callers copy them
//! verbatim into install status conditions.

use std::fmt;

use thiserror::Error;

/// Failure raised by an install store `create` call.
#[derive(Error, Debug)]
pub enum CreateError {
    /// An install with the same name already exists in the namespace.
    #[error("packageinstall {0} already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Candidate count after each stage of the version funnel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunnelReport {
    pub all: usize,
    pub stages: Vec<(&'static str, usize)>,
}

impl fmt::Display for FunnelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "all={}", self.all)?;
        for (name, count) in &self.stages {
            write!(f, " -> after-{}={}", name, count)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("Package {ref_name} not found")]
    NotFound { ref_name: String },

    #[error("Expected to find at least one version, but did not (details: {report})")]
    ConstraintUnsatisfiable { report: FunnelReport },

    #[error("Invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    #[error(
        "The following dependency overrides '{}' are not defined as dependencies in the Package {package}",
        .overrides.join(", ")
    )]
    InvalidOverride {
        overrides: Vec<String>,
        package: String,
    },

    /// One line per failed dependency, in declaration order.
    #[error("Failed to resolve the following dependencies:\n {}", .failures.join("\n"))]
    Resolution { failures: Vec<String> },

    #[error("unable to create the packageinstall for the package {package}: {source}")]
    Create {
        package: String,
        #[source]
        source: CreateError,
    },

    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}
