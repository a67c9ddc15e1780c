//! Predicate implementations, one file per concern

pub mod coverage;
pub mod handover;
pub mod high_load;
pub mod overlapping;
pub mod overshooting;

pub use coverage::BadCoveragePredicate;
pub use handover::{InterFrequencyHandoverPredicate, IntraFrequencyHandoverPredicate};
pub use high_load::HighLoadPredicate;
pub use overlapping::OverlappingPredicate;
pub use overshooting::OvershootingPredicate;
