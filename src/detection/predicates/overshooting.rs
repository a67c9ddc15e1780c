//! Overshooting predicate

use crate::detection::{DetectionContext, FaultPredicate, Verdict};
use crate::types::{FaultFlags, FaultKind, Sample};

/// Good serving RSRP reaching a UE that is far from site at high power
pub struct OvershootingPredicate;

impl FaultPredicate for OvershootingPredicate {
    fn kind(&self) -> FaultKind {
        FaultKind::Overshooting
    }

    fn evaluate(&self, sample: &Sample, earlier: &FaultFlags, ctx: &DetectionContext<'_>) -> Verdict {
        (ctx.is_underperforming(sample)
            && sample.serving.rsrp_dbm >= ctx.thresholds.coverage.target_rsrp_dbm
            && sample.far_high_power
            && !earlier.any_handover())
        .into()
    }
}
