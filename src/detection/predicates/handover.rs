//! Missed-handover predicates (intra- and inter-frequency)
//!
//! A handover is "missed" when a neighbor is stronger than the serving cell
//! by more than the configured margin. Both predicates share the same serving
//! condition: either the serving cell is below target while some neighbor is
//! usable, or it is above target but the UE is far out at high power.

use crate::detection::{DetectionContext, FaultPredicate, Verdict};
use crate::types::{FaultFlags, FaultKind, Sample};

/// Serving-side condition shared by both handover predicates.
fn serving_condition(sample: &Sample, ctx: &DetectionContext<'_>) -> bool {
    let target = ctx.thresholds.coverage.target_rsrp_dbm;
    if sample.serving.rsrp_dbm < target {
        !sample.all_neighbors_below(target)
    } else {
        sample.far_high_power
    }
}

/// Some neighbor on a carrier accepted by `carrier` beats serving by the margin.
fn stronger_neighbor(
    sample: &Sample,
    ctx: &DetectionContext<'_>,
    carrier: impl Fn(u32) -> bool,
) -> bool {
    let floor = sample.serving.rsrp_dbm + ctx.thresholds.handover.neighbor_margin_db;
    sample.neighbors.iter().any(|n| match (n.rsrp_dbm, n.earfcn) {
        (Some(rsrp), Some(earfcn)) => rsrp > floor && carrier(earfcn),
        _ => false,
    })
}

/// Same-carrier neighbor clearly stronger than serving
pub struct IntraFrequencyHandoverPredicate;

impl FaultPredicate for IntraFrequencyHandoverPredicate {
    fn kind(&self) -> FaultKind {
        FaultKind::IntraFrequencyHandover
    }

    fn evaluate(&self, sample: &Sample, _earlier: &FaultFlags, ctx: &DetectionContext<'_>) -> Verdict {
        let serving = sample.serving.earfcn;
        (ctx.is_underperforming(sample)
            && stronger_neighbor(sample, ctx, |earfcn| earfcn == serving)
            && serving_condition(sample, ctx))
        .into()
    }
}

/// Other-carrier neighbor clearly stronger than a very weak serving cell
pub struct InterFrequencyHandoverPredicate;

impl FaultPredicate for InterFrequencyHandoverPredicate {
    fn kind(&self) -> FaultKind {
        FaultKind::InterFrequencyHandover
    }

    fn evaluate(&self, sample: &Sample, earlier: &FaultFlags, ctx: &DetectionContext<'_>) -> Verdict {
        let serving = sample.serving.earfcn;
        (ctx.is_underperforming(sample)
            && !earlier.intra_handover
            && sample.serving.rsrp_dbm < ctx.thresholds.coverage.min_serving_rsrp_dbm
            && stronger_neighbor(sample, ctx, |earfcn| earfcn != serving)
            && serving_condition(sample, ctx))
        .into()
    }
}
