//! Analysis report: enriched samples, the area side-table and partitions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Diagnostics;
use crate::types::{
    AreaAnnotation, AreaId, DominantLabel, FaultFlags, FaultKind, OverlapReport, Sample, NO_AREA,
};

/// A sample with everything the pipeline derived for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedSample {
    pub sample: Sample,
    pub area_id: AreaId,
    pub flags: FaultFlags,
    pub overlap: OverlapReport,
    /// Number of predicates that fired
    pub total_issues: usize,
}

/// Complete output of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Survey name from the config
    pub survey: String,
    /// Throughput target the run used for the underperforming test (kbps)
    pub target_kbps: f64,
    /// Samples in sorted order
    pub samples: Vec<AnnotatedSample>,
    /// Side-table keyed by area id
    pub areas: BTreeMap<AreaId, AreaAnnotation>,
    pub diagnostics: Diagnostics,
}

impl AnalysisReport {
    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    /// Side-table entry surfaced on sample `index` (its area's first sample).
    fn annotation_at(&self, index: usize) -> Option<&AreaAnnotation> {
        let area_id = self.samples.get(index)?.area_id;
        self.areas
            .get(&area_id)
            .filter(|a| a.stats.first_index == index)
    }

    /// Profile text, exposed only on the first sample of an area.
    pub fn profile_for_sample(&self, index: usize) -> Option<&str> {
        self.annotation_at(index).map(|a| a.profile.as_str())
    }

    /// Dominant label, exposed only on the first sample of an area.
    pub fn dominant_for_sample(&self, index: usize) -> Option<DominantLabel> {
        self.annotation_at(index).and_then(|a| a.dominant)
    }

    /// Indices of samples inside a problem area.
    pub fn problem_areas(&self) -> Vec<usize> {
        self.indices_where(|s| s.area_id != NO_AREA)
    }

    /// Indices of samples outside every area that also meet the throughput target.
    pub fn problem_free(&self) -> Vec<usize> {
        self.indices_where(|s| {
            s.area_id == NO_AREA && !s.sample.is_underperforming(self.target_kbps)
        })
    }

    /// For each fault category, the sample indices of every area whose
    /// dominant label is that category. Categories with no areas are absent.
    pub fn areas_by_dominant(&self) -> BTreeMap<FaultKind, Vec<usize>> {
        let mut out: BTreeMap<FaultKind, Vec<usize>> = BTreeMap::new();
        for (i, s) in self.samples.iter().enumerate() {
            let label = self.areas.get(&s.area_id).and_then(|a| a.dominant);
            if let Some(DominantLabel::Fault(kind)) = label {
                out.entry(kind).or_default().push(i);
            }
        }
        out
    }

    /// Number of areas per dominant label, keyed by label text.
    pub fn dominant_counts(&self) -> BTreeMap<String, usize> {
        let mut out = BTreeMap::new();
        for a in self.areas.values() {
            let key = a.dominant.map_or_else(|| "Unresolved".to_string(), |d| d.to_string());
            *out.entry(key).or_default() += 1;
        }
        out
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn indices_where(&self, pred: impl Fn(&AnnotatedSample) -> bool) -> Vec<usize> {
        self.samples
            .iter()
            .enumerate()
            .filter(|(_, s)| pred(s))
            .map(|(i, _)| i)
            .collect()
    }

    /// Flat per-sample rows: area text columns are filled on first rows only.
    pub fn rows(&self) -> Vec<ReportRow> {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, s)| ReportRow {
                timestamp: s.sample.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
                throughput_kbps: s.sample.throughput_kbps,
                serving_pci: s.sample.serving.pci,
                area_id: s.area_id,
                bad_coverage: s.flags.bad_coverage,
                intra_frequency_handover: s.flags.intra_handover,
                inter_frequency_handover: s.flags.inter_handover,
                overshooting: s.flags.overshooting,
                overlapping: s.flags.overlapping,
                high_load: s.flags.high_load,
                overlap_count: s.overlap.count,
                overlapping_cells: s.overlap.cell_list(),
                total_issues: s.total_issues,
                area_problems: self.profile_for_sample(i).unwrap_or_default().to_string(),
                dominant_problem: self
                    .annotation_at(i)
                    .and_then(|a| a.dominant)
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            })
            .collect()
    }
}

/// One flattened output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub timestamp: String,
    pub throughput_kbps: f64,
    pub serving_pci: u32,
    pub area_id: AreaId,
    pub bad_coverage: bool,
    pub intra_frequency_handover: bool,
    pub inter_frequency_handover: bool,
    pub overshooting: bool,
    pub overlapping: bool,
    pub high_load: bool,
    pub overlap_count: usize,
    pub overlapping_cells: String,
    pub total_issues: usize,
    pub area_problems: String,
    pub dominant_problem: String,
}
