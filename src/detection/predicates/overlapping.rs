//! Overlapping predicate and overlap scan
//!
//! The scan runs for every sample so the overlap report always describes the
//! qualifying neighbors, whether or not the predicate fires.

use std::collections::BTreeSet;

use crate::config::ThresholdConfig;
use crate::detection::{DetectionContext, FaultPredicate, Verdict};
use crate::types::{FaultFlags, FaultKind, OverlapReport, Sample};

/// Same-carrier neighbors that compete with the serving cell: fully
/// reported, distinct identity, within the RSRP window and above target.
pub fn qualifying_neighbors(sample: &Sample, thresholds: &ThresholdConfig) -> Vec<u32> {
    let serving = &sample.serving;
    let window = thresholds.overlap.window_db;
    let target = thresholds.coverage.target_rsrp_dbm;

    sample
        .neighbors
        .iter()
        .filter_map(|n| n.complete())
        .filter(|&(rsrp, earfcn, pci)| {
            earfcn == serving.earfcn
                && pci != serving.pci
                && (serving.rsrp_dbm - rsrp).abs() <= window
                && rsrp > target
        })
        .map(|(_, _, pci)| pci)
        .collect()
}

/// Poor SINR despite good RSRP, with comparable same-carrier neighbors
pub struct OverlappingPredicate;

impl FaultPredicate for OverlappingPredicate {
    fn kind(&self) -> FaultKind {
        FaultKind::Overlapping
    }

    fn evaluate(&self, sample: &Sample, _earlier: &FaultFlags, ctx: &DetectionContext<'_>) -> Verdict {
        let t = ctx.thresholds;
        let neighbors = qualifying_neighbors(sample, t);

        let fired = ctx.is_underperforming(sample)
            && sample.serving.sinr_db < t.overlap.min_sinr_db
            && sample.serving.rsrp_dbm > t.coverage.target_rsrp_dbm
            && !neighbors.is_empty();

        let mut cell_ids: BTreeSet<String> = neighbors.iter().map(u32::to_string).collect();
        if fired {
            cell_ids.insert(sample.serving.pci.to_string());
        }

        Verdict {
            fired,
            overlap: Some(OverlapReport {
                count: neighbors.len() + usize::from(fired),
                cell_ids,
            }),
            soft_failure: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::predicates::test_support::*;
    use crate::types::Neighbor;

    fn run(sample: &Sample) -> Verdict {
        let thresholds = thresholds();
        let capacity = empty_capacity();
        let ctx = DetectionContext {
            thresholds: &thresholds,
            capacity: &capacity,
        };
        OverlappingPredicate.evaluate(sample, &FaultFlags::default(), &ctx)
    }

    #[test]
    fn two_close_neighbors_overlap() {
        let s = bad_sample(
            -95.0,
            3.0,
            vec![
                Neighbor::new(-93.0, SERVING_EARFCN, 21),
                Neighbor::new(-97.0, SERVING_EARFCN, 104),
            ],
        );
        let v = run(&s);
        assert!(v.fired);
        let report = v.overlap.expect("overlap report");
        assert_eq!(report.count, 3);
        assert_eq!(report.cell_list(), "101, 104, 21");
    }

    #[test]
    fn neighbor_below_target_does_not_qualify() {
        // within the window, but -101 is below target
        let s = bad_sample(-97.0, 3.0, vec![Neighbor::new(-101.0, SERVING_EARFCN, 21)]);
        let v = run(&s);
        assert!(!v.fired);
        assert_eq!(v.overlap.expect("overlap report").cell_list(), "None");
    }

    #[test]
    fn other_carrier_and_same_pci_are_excluded() {
        let s = bad_sample(
            -95.0,
            3.0,
            vec![
                Neighbor::new(-94.0, 3050, 21),
                Neighbor::new(-94.0, SERVING_EARFCN, SERVING_PCI),
            ],
        );
        assert!(qualifying_neighbors(&s, &thresholds()).is_empty());
    }

    #[test]
    fn report_lists_neighbors_even_when_sinr_is_fine() {
        let s = bad_sample(-95.0, 18.0, vec![Neighbor::new(-92.0, SERVING_EARFCN, 21)]);
        let v = run(&s);
        assert!(!v.fired);
        let report = v.overlap.expect("overlap report");
        assert_eq!(report.count, 1);
        assert_eq!(report.cell_list(), "21");
    }

    #[test]
    fn duplicate_neighbor_ids_are_deduplicated() {
        let s = bad_sample(
            -95.0,
            3.0,
            vec![
                Neighbor::new(-93.0, SERVING_EARFCN, 21),
                Neighbor::new(-96.0, SERVING_EARFCN, 21),
            ],
        );
        let report = run(&s).overlap.expect("overlap report");
        assert_eq!(report.count, 3);
        assert_eq!(report.cell_ids.len(), 2);
    }
}
