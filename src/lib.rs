//! FAULTLINE: Drive-Test Fault-Area Segmentation & Classification
//!
//! Finds contiguous stretches of poor throughput in a radio drive-test and
//! labels each with one root cause from a fixed taxonomy.
//!
//! ## Architecture
//!
//! - **Segmentation**: sample stream → bounded problem areas
//! - **Detection**: six interacting per-sample fault predicates
//! - **Aggregation**: per-area predicate shares → ranked area profile
//! - **Resolution**: severity-ranked cascade → one dominant label per area

pub mod config;
pub mod types;
pub mod error;
pub mod input;
pub mod segmentation;
pub mod detection;
pub mod aggregation;
pub mod resolution;
pub mod pipeline;

// Re-export configuration
pub use config::{AnalysisConfig, ConfigError, GapPolicy};

// Re-export commonly used types
pub use types::{
    AreaAnnotation, AreaId, AreaProfile, AreaStats, CapacityTable, CellIdentity, DominantLabel,
    FaultFlags, FaultKind, Neighbor, OverlapReport, ProfileEntry, Sample, ServingCell,
};

// Re-export pipeline stages
pub use segmentation::AreaSegmenter;
pub use detection::{DetectionContext, FaultDetector, FaultPredicate};
pub use aggregation::AreaAggregator;
pub use resolution::DominantResolver;
pub use pipeline::{AnalysisReport, AnnotatedSample, FaultPipeline};

// Re-export errors and I/O boundary
pub use error::{Diagnostics, PipelineError, SoftFailure};
pub use input::SurveyInput;
