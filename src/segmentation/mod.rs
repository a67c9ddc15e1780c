//! Problem-Area Segmentation
//!
//! Splits a time-sorted sample stream into bounded "problem areas": maximal
//! runs of underperforming samples, cut when a run grows too long or when
//! consecutive underperforming samples are too far apart in time.
//!
//! Four passes over the sorted sequence:
//! 1. Run assignment (sequential, stateful)
//! 2. Gap policy (optional closing of one-sample holes)
//! 3. Dissolution of undersized areas
//! 4. Dense renumbering in first-appearance order

use std::collections::HashMap;

use chrono::{NaiveDateTime, SubsecRound};
use tracing::debug;

use crate::config::{GapPolicy, SegmentationConfig};
use crate::types::{AreaId, Sample, NO_AREA};

/// Problem-area segmenter. Inputs must already be sorted by timestamp.
#[derive(Debug, Clone)]
pub struct AreaSegmenter {
    config: SegmentationConfig,
    target_kbps: f64,
}

impl AreaSegmenter {
    pub fn new(config: SegmentationConfig, target_kbps: f64) -> Self {
        Self {
            config,
            target_kbps,
        }
    }

    /// Assign an area id to every sample. Returns one id per input sample.
    pub fn segment(&self, samples: &[Sample]) -> Vec<AreaId> {
        let mut ids = self.assign_runs(samples);
        if self.config.gap_policy == GapPolicy::Close {
            Self::close_gaps(&mut ids);
        }
        Self::dissolve_small(&mut ids, self.config.min_area_samples);
        let areas = Self::renumber(&mut ids);
        debug!(samples = samples.len(), areas, "Segmentation complete");
        ids
    }

    /// First pass: open a new area on the first underperforming sample, when
    /// the current run is full, or after a time gap.
    fn assign_runs(&self, samples: &[Sample]) -> Vec<AreaId> {
        let mut ids = vec![NO_AREA; samples.len()];
        let mut current: AreaId = NO_AREA;
        let mut run_length = 0usize;
        let mut previous: Option<NaiveDateTime> = None;

        for (slot, sample) in ids.iter_mut().zip(samples) {
            if !sample.is_underperforming(self.target_kbps) {
                continue;
            }

            let split = match previous {
                None => true,
                Some(prev) => {
                    run_length >= self.config.max_area_samples
                        || Self::gap_seconds(prev, sample.timestamp) > self.config.max_gap_seconds
                }
            };
            if split {
                current += 1;
                run_length = 0;
            }

            *slot = current;
            run_length += 1;
            previous = Some(sample.timestamp);
        }
        ids
    }

    /// Gap in whole seconds; both times are truncated to the second first.
    fn gap_seconds(previous: NaiveDateTime, current: NaiveDateTime) -> f64 {
        (current.trunc_subsecs(0) - previous.trunc_subsecs(0)).num_seconds() as f64
    }

    /// Second pass (`close` policy): a single area-0 sample between two
    /// samples of the same positive area joins that area.
    fn close_gaps(ids: &mut [AreaId]) {
        let original = ids.to_vec();
        for i in 1..original.len().saturating_sub(1) {
            let (before, here, after) = (original[i - 1], original[i], original[i + 1]);
            if here == NO_AREA && before != NO_AREA && before == after {
                ids[i] = before;
            }
        }
    }

    /// Third pass: areas with fewer than `min_size` members go back to 0.
    fn dissolve_small(ids: &mut [AreaId], min_size: usize) {
        let mut sizes: HashMap<AreaId, usize> = HashMap::new();
        for &id in ids.iter().filter(|id| **id != NO_AREA) {
            *sizes.entry(id).or_default() += 1;
        }
        for id in ids.iter_mut() {
            if *id != NO_AREA && sizes.get(id).copied().unwrap_or(0) < min_size {
                *id = NO_AREA;
            }
        }
    }

    /// Fourth pass: dense ids 1..N in order of first appearance.
    /// Returns the number of surviving areas.
    fn renumber(ids: &mut [AreaId]) -> usize {
        let mut mapping: HashMap<AreaId, AreaId> = HashMap::new();
        for id in ids.iter_mut().filter(|id| **id != NO_AREA) {
            let next = mapping.len() as AreaId + 1;
            *id = *mapping.entry(*id).or_insert(next);
        }
        mapping.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServingCell;
    use chrono::{Duration, NaiveDate};

    fn sample_at(offset_ms: i64, throughput_kbps: f64) -> Sample {
        let base = NaiveDate::from_ymd_opt(2024, 5, 14)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid base time");
        Sample {
            timestamp: base + Duration::milliseconds(offset_ms),
            throughput_kbps,
            serving: ServingCell {
                rsrp_dbm: -90.0,
                sinr_db: 15.0,
                rsrq_db: -10.0,
                earfcn: 1650,
                pci: 101,
                enodeb_id: 5001,
                resource_blocks: 50.0,
                tx_power_dbm: 5.0,
            },
            neighbors: Vec::new(),
            distance_to_site_m: 200.0,
            far_high_power: false,
        }
    }

    /// Samples 1 s apart; `true` means underperforming.
    fn stream(pattern: &[bool]) -> Vec<Sample> {
        pattern
            .iter()
            .enumerate()
            .map(|(i, bad)| sample_at(i as i64 * 1000, if *bad { 2_000.0 } else { 20_000.0 }))
            .collect()
    }

    fn segmenter(policy: GapPolicy) -> AreaSegmenter {
        AreaSegmenter::new(
            SegmentationConfig {
                gap_policy: policy,
                ..SegmentationConfig::default()
            },
            10_000.0,
        )
    }

    #[test]
    fn healthy_samples_stay_in_area_zero() {
        let ids = segmenter(GapPolicy::Keep).segment(&stream(&[false; 10]));
        assert!(ids.iter().all(|id| *id == NO_AREA));
    }

    #[test]
    fn long_run_is_split_at_max_size() {
        // 22 bad samples: 15 + 7, both survive
        let ids = segmenter(GapPolicy::Keep).segment(&stream(&[true; 22]));
        assert_eq!(ids[..15], [1; 15]);
        assert_eq!(ids[15..], [2; 7]);
    }

    #[test]
    fn short_tail_after_split_dissolves() {
        let ids = segmenter(GapPolicy::Keep).segment(&stream(&[true; 18]));
        assert_eq!(ids[..15], [1; 15]);
        assert_eq!(ids[15..], [0; 3]);
    }

    #[test]
    fn gap_exactly_at_limit_does_not_split() {
        let samples: Vec<Sample> = (0..8).map(|i| sample_at(i * 4000, 1_000.0)).collect();
        let ids = segmenter(GapPolicy::Keep).segment(&samples);
        assert!(ids.iter().all(|id| *id == 1));
    }

    #[test]
    fn sub_second_parts_are_ignored_in_gaps() {
        // 09:00:03.000 → 09:00:07.500 is a 4 s gap once truncated: no split
        let mut samples: Vec<Sample> = (0..4).map(|i| sample_at(i * 1000, 1_000.0)).collect();
        samples.extend((0..4).map(|i| sample_at(7_500 + i * 1000, 1_000.0)));
        let ids = segmenter(GapPolicy::Keep).segment(&samples);
        assert_eq!(ids, vec![1; 8]);

        // 09:00:03.900 → 09:00:08.100 is 4.2 s elapsed but 5 s truncated: split
        let mut samples: Vec<Sample> = (0..4).map(|i| sample_at(900 + i * 1000, 1_000.0)).collect();
        samples.extend((0..4).map(|i| sample_at(8_100 + i * 1000, 1_000.0)));
        let ids = segmenter(GapPolicy::Keep).segment(&samples);
        assert_eq!(ids, vec![0; 8]);
    }

    #[test]
    fn healthy_sample_does_not_break_run() {
        let mut pattern = vec![true; 4];
        pattern.push(false);
        pattern.extend([true; 4]);
        let ids = segmenter(GapPolicy::Keep).segment(&stream(&pattern));
        assert_eq!(ids, vec![1, 1, 1, 1, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn close_policy_fills_single_holes() {
        let mut pattern = vec![true; 4];
        pattern.push(false);
        pattern.extend([true; 4]);
        let ids = segmenter(GapPolicy::Close).segment(&stream(&pattern));
        assert_eq!(ids, vec![1; 9]);
    }

    #[test]
    fn renumbering_is_dense_in_first_appearance_order() {
        let mut ids = vec![0, 4, 4, 0, 9, 9, 4];
        let count = AreaSegmenter::renumber(&mut ids);
        assert_eq!(count, 2);
        assert_eq!(ids, vec![0, 1, 1, 0, 2, 2, 1]);
    }
}
