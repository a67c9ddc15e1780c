//! Property tests for segmentation, detection and resolution invariants.

mod common;

use std::collections::BTreeMap;

use common::{healthy, slow};
use faultline::config::{ResolutionConfig, SegmentationConfig, ThresholdConfig};
use faultline::resolution::{AreaEvidence, AreaRankSums};
use faultline::types::{ProfileEntry, NO_AREA};
use faultline::{
    AreaSegmenter, CapacityTable, DetectionContext, DominantResolver, FaultDetector, FaultKind,
    Neighbor, Sample,
};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

const MIN_PROPTEST_CASES: u32 = 256;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

/// (seconds since previous sample, underperforming?)
fn stream_strategy() -> impl Strategy<Value = Vec<(i64, bool)>> {
    prop::collection::vec((0i64..8, any::<bool>()), 0..120)
}

fn build_stream(steps: &[(i64, bool)]) -> Vec<Sample> {
    let mut t = 0;
    steps
        .iter()
        .map(|&(dt, bad)| {
            t += dt;
            if bad {
                slow(t)
            } else {
                healthy(t)
            }
        })
        .collect()
}

fn kind_strategy() -> impl Strategy<Value = FaultKind> {
    prop::sample::select(FaultKind::ALL.to_vec())
}

fn evidence_strategy() -> impl Strategy<Value = AreaEvidence> {
    (0u32..60, 0u32..60, 0u32..60, 0u32..60, any::<bool>(), any::<bool>()).prop_map(
        |(rsrp, sinr, resource_blocks, distance, intra_run, inter_run)| AreaEvidence {
            ranks: AreaRankSums {
                rsrp,
                sinr,
                resource_blocks,
                distance,
            },
            intra_run,
            inter_run,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        ..ProptestConfig::default()
    })]

    #[test]
    fn area_ids_are_dense_and_areas_meet_minimum_size(steps in stream_strategy()) {
        let samples = build_stream(&steps);
        let config = SegmentationConfig::default();
        let ids = AreaSegmenter::new(config.clone(), 10_000.0).segment(&samples);
        prop_assert_eq!(ids.len(), samples.len());

        let mut sizes: BTreeMap<u32, usize> = BTreeMap::new();
        let mut next_expected = 1;
        for (id, sample) in ids.iter().zip(&samples) {
            if *id == NO_AREA {
                continue;
            }
            prop_assert!(sample.is_underperforming(10_000.0));
            if !sizes.contains_key(id) {
                prop_assert_eq!(*id, next_expected, "ids appear in order 1..N");
                next_expected += 1;
            }
            *sizes.entry(*id).or_default() += 1;
        }
        for size in sizes.values() {
            prop_assert!(*size >= config.min_area_samples);
            prop_assert!(*size <= config.max_area_samples);
        }
    }

    #[test]
    fn overlap_report_is_sorted_and_counted(
        serving_rsrp in -110.0f64..-80.0,
        sinr in -5.0f64..20.0,
        neighbors in prop::collection::vec((-115.0f64..-75.0, prop::bool::ANY, 1u32..600), 0..4),
    ) {
        let mut s = slow(0);
        s.serving.rsrp_dbm = serving_rsrp;
        s.serving.sinr_db = sinr;
        s.neighbors = neighbors
            .into_iter()
            .map(|(rsrp, same, pci)| {
                let earfcn = if same { common::SERVING_EARFCN } else { common::OTHER_EARFCN };
                Neighbor::new(rsrp, earfcn, pci)
            })
            .collect();

        let thresholds = ThresholdConfig::default();
        let capacity = CapacityTable::new();
        let ctx = DetectionContext { thresholds: &thresholds, capacity: &capacity };
        let d = FaultDetector::new(false).detect_one(&s, &ctx);

        let ids: Vec<&String> = d.overlap.cell_ids.iter().collect();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(d.overlap.count >= d.overlap.cell_ids.len());
        if d.flags.overlapping {
            prop_assert!(d.overlap.count >= 2);
            prop_assert!(d.overlap.cell_ids.contains(&common::SERVING_PCI.to_string()));
        }
        prop_assert!(!(d.flags.intra_handover && d.flags.inter_handover));
        prop_assert!(!(d.flags.high_load && d.flags.total() > 1));
    }

    #[test]
    fn pair_resolution_is_commutative(
        a_kind in kind_strategy(),
        b_kind in kind_strategy(),
        a_pct in 0.0f64..100.0,
        b_pct in 0.0f64..100.0,
        evidence in evidence_strategy(),
    ) {
        prop_assume!(a_kind != b_kind);
        let resolver = DominantResolver::new(ResolutionConfig::default(), false);
        let a = ProfileEntry { kind: a_kind, percent: a_pct };
        let b = ProfileEntry { kind: b_kind, percent: b_pct };

        let ab = resolver.resolve_pair(a, b, &evidence);
        let ba = resolver.resolve_pair(b, a, &evidence);
        prop_assert_eq!(ab, ba);
        prop_assert!(ab == a_kind || ab == b_kind);
    }
}
