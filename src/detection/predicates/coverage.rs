//! Bad Coverage predicate

use crate::detection::{DetectionContext, FaultPredicate, Verdict};
use crate::types::{FaultFlags, FaultKind, Sample};

/// Weak serving RSRP that no missed handover explains
pub struct BadCoveragePredicate;

impl FaultPredicate for BadCoveragePredicate {
    fn kind(&self) -> FaultKind {
        FaultKind::BadCoverage
    }

    fn evaluate(&self, sample: &Sample, earlier: &FaultFlags, ctx: &DetectionContext<'_>) -> Verdict {
        let target = ctx.thresholds.coverage.target_rsrp_dbm;
        if !ctx.is_underperforming(sample) || sample.serving.rsrp_dbm >= target {
            return false.into();
        }
        // Everything weak is plain coverage; otherwise only when no handover fired
        (sample.all_neighbors_below(target) || !earlier.any_handover()).into()
    }
}
