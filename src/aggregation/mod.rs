//! Area Aggregation
//!
//! Turns per-sample fault flags into per-area statistics and an ordered
//! "area problem profile": the categories whose share of the area's samples
//! exceeds the minimum, strongest first.

use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::debug;

use crate::config::AggregationConfig;
use crate::types::{AreaId, AreaProfile, AreaStats, FaultFlags, FaultKind, ProfileEntry, NO_AREA};

/// Sample indices belonging to one area, in sorted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaMembers {
    pub area_id: AreaId,
    pub indices: Vec<usize>,
}

/// Group sample indices by positive area id. Output is ordered by area id.
pub fn group_areas(area_ids: &[AreaId]) -> Vec<AreaMembers> {
    let count = area_ids.iter().copied().max().unwrap_or(NO_AREA) as usize;
    let mut groups: Vec<AreaMembers> = (1..=count)
        .map(|id| AreaMembers {
            area_id: id as AreaId,
            indices: Vec::new(),
        })
        .collect();
    for (i, &id) in area_ids.iter().enumerate() {
        if id != NO_AREA {
            groups[id as usize - 1].indices.push(i);
        }
    }
    groups.retain(|g| !g.indices.is_empty());
    groups
}

/// Aggregated view of one area.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaSummary {
    pub stats: AreaStats,
    pub profile: AreaProfile,
}

/// Per-area percentage aggregator.
#[derive(Debug, Clone)]
pub struct AreaAggregator {
    config: AggregationConfig,
    parallel: bool,
}

impl AreaAggregator {
    pub fn new(config: AggregationConfig, parallel: bool) -> Self {
        Self { config, parallel }
    }

    /// Summarize every area. `flags` is indexed like the sorted samples.
    pub fn aggregate(&self, areas: &[AreaMembers], flags: &[FaultFlags]) -> Vec<AreaSummary> {
        let summarize = |members: &AreaMembers| {
            let stats = Self::stats(members, flags);
            let profile = self.profile(&stats);
            debug!(area = stats.area_id, size = stats.size, profile = %profile, "Area aggregated");
            AreaSummary { stats, profile }
        };
        if self.parallel {
            areas.par_iter().map(summarize).collect()
        } else {
            areas.iter().map(summarize).collect()
        }
    }

    fn stats(members: &AreaMembers, flags: &[FaultFlags]) -> AreaStats {
        let mut counts = [0usize; 6];
        for &i in &members.indices {
            for kind in FaultKind::ALL {
                if flags[i].get(kind) {
                    counts[kind.index()] += 1;
                }
            }
        }
        AreaStats {
            area_id: members.area_id,
            first_index: members.indices.first().copied().unwrap_or(0),
            size: members.indices.len(),
            counts,
        }
    }

    /// Top-N categories strictly above the minimum share, descending.
    /// Equal shares keep taxonomy order (stable sort).
    pub fn profile(&self, stats: &AreaStats) -> AreaProfile {
        let mut entries: Vec<ProfileEntry> = FaultKind::ALL
            .into_iter()
            .map(|kind| ProfileEntry {
                kind,
                percent: stats.percent(kind),
            })
            .filter(|e| e.percent > self.config.min_share_percent)
            .collect();

        if entries.is_empty() {
            return AreaProfile::OtherIssues;
        }

        entries.sort_by(|a, b| b.percent.partial_cmp(&a.percent).unwrap_or(Ordering::Equal));
        entries.truncate(self.config.top_n);
        AreaProfile::Ranked(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags_with(kinds: &[FaultKind]) -> FaultFlags {
        let mut f = FaultFlags::default();
        for k in kinds {
            f.set(*k, true);
        }
        f
    }

    fn aggregator() -> AreaAggregator {
        AreaAggregator::new(AggregationConfig::default(), false)
    }

    #[test]
    fn groups_follow_area_ids() {
        let groups = group_areas(&[0, 1, 1, 0, 2, 2, 2]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].indices, vec![1, 2]);
        assert_eq!(groups[1].area_id, 2);
        assert_eq!(groups[1].indices, vec![4, 5, 6]);
        assert!(group_areas(&[0, 0]).is_empty());
    }

    #[test]
    fn profile_keeps_top_three_above_twenty_percent() {
        use FaultKind::*;
        // 10 samples: BC 6, OL 5, HL 3, OS 2 (exactly 20% is excluded)
        let mut flags = Vec::new();
        for i in 0..10 {
            let mut kinds = Vec::new();
            if i < 6 {
                kinds.push(BadCoverage);
            }
            if i < 5 {
                kinds.push(Overlapping);
            }
            if i >= 7 {
                kinds.push(HighLoad);
            }
            if i == 6 || i == 9 {
                kinds.push(Overshooting);
            }
            flags.push(flags_with(&kinds));
        }
        let areas = group_areas(&[1; 10]);
        let summary = &aggregator().aggregate(&areas, &flags)[0];
        assert_eq!(summary.stats.counts[Overshooting.index()], 2);
        assert_eq!(
            summary.profile.to_string(),
            "Bad Coverage: 60%, Overlapping: 50%, High Load: 30%"
        );
    }

    #[test]
    fn ties_keep_taxonomy_order() {
        use FaultKind::*;
        let flags = vec![flags_with(&[HighLoad, Overshooting, BadCoverage]); 4];
        let areas = group_areas(&[1; 4]);
        let summary = &aggregator().aggregate(&areas, &flags)[0];
        let kinds: Vec<FaultKind> = summary.profile.entries().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![BadCoverage, Overshooting, HighLoad]);
    }

    #[test]
    fn quiet_area_is_other_issues() {
        let flags = vec![FaultFlags::default(); 8];
        let areas = group_areas(&[1; 8]);
        let summary = &aggregator().aggregate(&areas, &flags)[0];
        assert_eq!(summary.profile, AreaProfile::OtherIssues);
        assert_eq!(summary.profile.to_string(), "Other Issues ");
    }

    #[test]
    fn parallel_matches_sequential() {
        let flags: Vec<FaultFlags> = (0..30)
            .map(|i| {
                let kinds: Vec<FaultKind> = if i % 3 == 0 {
                    vec![FaultKind::Overlapping]
                } else {
                    Vec::new()
                };
                flags_with(&kinds)
            })
            .collect();
        let ids: Vec<AreaId> = (0..30).map(|i| (i / 10 + 1) as AreaId).collect();
        let areas = group_areas(&ids);
        let seq = aggregator().aggregate(&areas, &flags);
        let par = AreaAggregator::new(AggregationConfig::default(), true).aggregate(&areas, &flags);
        assert_eq!(seq, par);
    }
}
