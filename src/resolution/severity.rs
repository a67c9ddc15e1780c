//! Severity bands and per-area rank sums
//!
//! Bands are computed once per run over every problem-area sample and then
//! shared read-only by all per-area resolutions.
//!
//! - RSRP / SINR: quantile cut points over the values below their targets
//! - Resource blocks: fixed absolute edges
//! - Distance: multiples of the median inter-site distance
//!
//! Every rank is in 0..=5 with the default edges; higher means more severe.

use std::cmp::Ordering;

use crate::aggregation::AreaMembers;
use crate::config::AnalysisConfig;
use crate::types::{FaultFlags, FaultKind, Sample};

/// Linear-interpolated quantile of an ascending slice.
///
/// Position `q * (n - 1)`, interpolating between the neighbouring order
/// statistics. Returns `None` for an empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Quantile cut points; rank = number of cuts strictly above the value.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileBand {
    cuts: Vec<f64>,
}

impl QuantileBand {
    /// `None` when there are no values to band.
    pub fn from_values(mut values: Vec<f64>, levels: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let cuts = levels
            .iter()
            .filter_map(|q| quantile(&values, *q))
            .collect();
        Some(Self { cuts })
    }

    pub fn cuts(&self) -> &[f64] {
        &self.cuts
    }

    /// x < c0 → 5, x < c1 → 4, ..., otherwise 0 (for five cuts).
    pub fn rank(&self, x: f64) -> u32 {
        self.cuts.iter().filter(|c| x < **c).count() as u32
    }
}

/// Corpus-wide severity bands for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityBands {
    pub rsrp: Option<QuantileBand>,
    pub sinr: Option<QuantileBand>,
    resource_block_edges: Vec<f64>,
    distance_edges_m: Vec<f64>,
}

impl SeverityBands {
    /// Compute the bands over the members of every problem area.
    pub fn compute(
        samples: &[Sample],
        areas: &[AreaMembers],
        config: &AnalysisConfig,
        median_site_distance_m: f64,
    ) -> Self {
        let target_rsrp = config.thresholds.coverage.target_rsrp_dbm;
        let min_sinr = config.thresholds.overlap.min_sinr_db;
        let levels = &config.resolution.quantile_levels;

        let members = || areas.iter().flat_map(|a| a.indices.iter()).map(|&i| &samples[i]);
        let weak_rsrp: Vec<f64> = members()
            .map(|s| s.serving.rsrp_dbm)
            .filter(|r| *r < target_rsrp)
            .collect();
        let poor_sinr: Vec<f64> = members()
            .map(|s| s.serving.sinr_db)
            .filter(|v| *v < min_sinr)
            .collect();

        Self {
            rsrp: QuantileBand::from_values(weak_rsrp, levels),
            sinr: QuantileBand::from_values(poor_sinr, levels),
            resource_block_edges: config.resolution.resource_block_edges.clone(),
            distance_edges_m: config
                .resolution
                .distance_multiples
                .iter()
                .map(|m| m * median_site_distance_m)
                .collect(),
        }
    }

    pub fn rsrp_rank(&self, rsrp_dbm: f64) -> u32 {
        self.rsrp.as_ref().map_or(0, |b| b.rank(rsrp_dbm))
    }

    pub fn sinr_rank(&self, sinr_db: f64) -> u32 {
        self.sinr.as_ref().map_or(0, |b| b.rank(sinr_db))
    }

    /// ≤ e0 → 5, (e0, e1] → 4, ..., > e4 → 0 (for five edges).
    pub fn resource_block_rank(&self, resource_blocks: f64) -> u32 {
        self.resource_block_edges
            .iter()
            .filter(|e| resource_blocks <= **e)
            .count() as u32
    }

    /// ≤ 2d → 0, (2d, 3d] → 1, ..., > 6d → 5 (default multiples).
    pub fn distance_rank(&self, distance_m: f64) -> u32 {
        self.distance_edges_m
            .iter()
            .filter(|e| distance_m > **e)
            .count() as u32
    }
}

/// Rank sums for one area, each counted only over samples where the
/// matching predicate fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AreaRankSums {
    /// RSRP ranks over Bad Coverage samples
    pub rsrp: u32,
    /// SINR ranks over Overlapping samples
    pub sinr: u32,
    /// Resource-block ranks over High Load samples
    pub resource_blocks: u32,
    /// Distance ranks over Overshooting samples
    pub distance: u32,
}

impl AreaRankSums {
    pub fn compute(
        bands: &SeverityBands,
        samples: &[Sample],
        flags: &[FaultFlags],
        members: &AreaMembers,
    ) -> Self {
        let mut sums = Self::default();
        for &i in &members.indices {
            let (s, f) = (&samples[i], &flags[i]);
            if f.bad_coverage {
                sums.rsrp += bands.rsrp_rank(s.serving.rsrp_dbm);
            }
            if f.overlapping {
                sums.sinr += bands.sinr_rank(s.serving.sinr_db);
            }
            if f.high_load {
                sums.resource_blocks += bands.resource_block_rank(s.serving.resource_blocks);
            }
            if f.overshooting {
                sums.distance += bands.distance_rank(s.distance_to_site_m);
            }
        }
        sums
    }

    /// The rank sum that speaks for `kind`; handover categories have none.
    pub fn for_kind(&self, kind: FaultKind) -> Option<u32> {
        match kind {
            FaultKind::BadCoverage => Some(self.rsrp),
            FaultKind::Overlapping => Some(self.sinr),
            FaultKind::HighLoad => Some(self.resource_blocks),
            FaultKind::Overshooting => Some(self.distance),
            FaultKind::IntraFrequencyHandover | FaultKind::InterFrequencyHandover => None,
        }
    }
}
