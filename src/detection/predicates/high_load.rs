//! High Load predicate

use crate::detection::{DetectionContext, FaultPredicate, Verdict};
use crate::types::{CellIdentity, FaultFlags, FaultKind, Sample};

/// Few resource blocks on a heavily utilized cell, with no radio explanation
pub struct HighLoadPredicate;

impl FaultPredicate for HighLoadPredicate {
    fn kind(&self) -> FaultKind {
        FaultKind::HighLoad
    }

    fn evaluate(&self, sample: &Sample, earlier: &FaultFlags, ctx: &DetectionContext<'_>) -> Verdict {
        let load = &ctx.thresholds.load;
        if !ctx.is_underperforming(sample)
            || earlier.total() > 0
            || sample.serving.resource_blocks >= load.max_resource_blocks
        {
            return false.into();
        }

        // Looked up only once the KPI gates pass
        match ctx.capacity.utilization(&CellIdentity::serving(sample)) {
            Ok(util) => (util > load.utilization_threshold_percent).into(),
            Err(e) => Verdict {
                fired: false,
                overlap: None,
                soft_failure: Some(e),
            },
        }
    }
}
