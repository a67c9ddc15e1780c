//! Fault predicates and the per-sample fault detector
//!
//! Each predicate judges one sample from one root-cause perspective and may
//! read the verdicts of predicates evaluated before it on the same sample.
//!
//! ## Evaluation order
//!
//! 1. **Intra-Frequency Handover** - stronger same-carrier neighbor
//! 2. **Inter-Frequency Handover** - stronger other-carrier neighbor, weak serving
//! 3. **Bad Coverage** - weak serving, no handover explains it
//! 4. **Overshooting** - good serving RSRP far from site at high UE power
//! 5. **Overlapping** - good RSRP, poor SINR, comparable same-carrier neighbors
//! 6. **High Load** - nothing else fired, few RBs on a busy cell
//!
//! Samples are independent, so detection fans out across the rayon pool.

pub mod predicates;

pub use predicates::{
    BadCoveragePredicate, HighLoadPredicate, InterFrequencyHandoverPredicate,
    IntraFrequencyHandoverPredicate, OverlappingPredicate, OvershootingPredicate,
};

use rayon::prelude::*;

use crate::config::ThresholdConfig;
use crate::types::{CapacityError, CapacityTable, FaultFlags, FaultKind, OverlapReport, Sample};

/// Run-scoped, read-only inputs shared by every predicate.
#[derive(Debug, Clone, Copy)]
pub struct DetectionContext<'a> {
    pub thresholds: &'a ThresholdConfig,
    pub capacity: &'a CapacityTable,
}

impl DetectionContext<'_> {
    pub fn is_underperforming(&self, sample: &Sample) -> bool {
        sample.is_underperforming(self.thresholds.throughput.target_kbps)
    }
}

/// Result of one predicate on one sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verdict {
    pub fired: bool,
    /// Overlap side output (Overlapping predicate only)
    pub overlap: Option<OverlapReport>,
    /// Soft failure hit while evaluating (High Load capacity lookup)
    pub soft_failure: Option<CapacityError>,
}

impl From<bool> for Verdict {
    fn from(fired: bool) -> Self {
        Self {
            fired,
            ..Self::default()
        }
    }
}

/// Trait for per-sample fault predicates
///
/// `earlier` holds the verdicts of every predicate that precedes this one in
/// the detector's order; later slots are still false.
pub trait FaultPredicate: Send + Sync {
    /// Category this predicate sets
    fn kind(&self) -> FaultKind;

    /// Judge one sample
    fn evaluate(&self, sample: &Sample, earlier: &FaultFlags, ctx: &DetectionContext<'_>) -> Verdict;
}

/// Create the six predicates in evaluation order
pub fn default_predicates() -> Vec<Box<dyn FaultPredicate>> {
    vec![
        Box::new(IntraFrequencyHandoverPredicate),
        Box::new(InterFrequencyHandoverPredicate),
        Box::new(BadCoveragePredicate),
        Box::new(OvershootingPredicate),
        Box::new(OverlappingPredicate),
        Box::new(HighLoadPredicate),
    ]
}

/// Detector output for one sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleDetection {
    pub flags: FaultFlags,
    pub overlap: OverlapReport,
    pub soft_failure: Option<CapacityError>,
}

/// Runs the predicate chain over every sample.
pub struct FaultDetector {
    predicates: Vec<Box<dyn FaultPredicate>>,
    parallel: bool,
}

impl Default for FaultDetector {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FaultDetector {
    pub fn new(parallel: bool) -> Self {
        Self {
            predicates: default_predicates(),
            parallel,
        }
    }

    /// Evaluate all samples; output order matches input order.
    pub fn detect(&self, samples: &[Sample], ctx: &DetectionContext<'_>) -> Vec<SampleDetection> {
        if self.parallel {
            samples.par_iter().map(|s| self.detect_one(s, ctx)).collect()
        } else {
            samples.iter().map(|s| self.detect_one(s, ctx)).collect()
        }
    }

    /// Evaluate the predicate chain on a single sample.
    pub fn detect_one(&self, sample: &Sample, ctx: &DetectionContext<'_>) -> SampleDetection {
        let mut out = SampleDetection::default();
        for predicate in &self.predicates {
            let verdict = predicate.evaluate(sample, &out.flags, ctx);
            out.flags.set(predicate.kind(), verdict.fired);
            if let Some(overlap) = verdict.overlap {
                out.overlap = overlap;
            }
            if verdict.soft_failure.is_some() {
                out.soft_failure = verdict.soft_failure;
            }
        }
        out
    }
}
