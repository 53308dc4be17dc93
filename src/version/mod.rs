//! Version selection for packages.
//!
//! This module picks, for a ref name and a version selection, the single
//! highest catalog package that survives every compatibility check.

mod finder;
mod funnel;
pub mod range;

pub use finder::{
    IGNORE_CONTROLLER_VERSION_ANNOTATION, IGNORE_KUBERNETES_VERSION_ANNOTATION, PackageFinder,
};
pub use funnel::{
    AmbientVersionFilter, Candidate, CandidateFilter, Funnel, PrereleaseFilter, RangeFilter,
};
pub use range::Range;
