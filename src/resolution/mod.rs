//! Dominant-Problem Resolution
//!
//! Reduces an area profile to a single root-cause label. Two-way contests go
//! through a fixed cascade:
//!
//! 1. A decisive percentage lead wins outright
//! 2. A sustained handover run makes the handover category win
//! 3. The pair rule table compares severity rank sums
//! 4. Otherwise the larger share wins
//!
//! Profiles with three or more entries settle the runner-up contest first,
//! then pit its winner against the leader.

pub mod rules;
pub mod severity;

pub use rules::{rule_for, PairRule, PAIR_RULES};
pub use severity::{quantile, AreaRankSums, QuantileBand, SeverityBands};

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::aggregation::AreaMembers;
use crate::config::ResolutionConfig;
use crate::types::{AreaProfile, DominantLabel, FaultFlags, FaultKind, ProfileEntry, ProfileError, Sample};

/// Per-area facts the resolver consults beyond the profile itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AreaEvidence {
    pub ranks: AreaRankSums,
    /// Area holds a run of consecutive Intra-Frequency Handover samples
    pub intra_run: bool,
    /// Area holds a run of consecutive Inter-Frequency Handover samples
    pub inter_run: bool,
}

impl AreaEvidence {
    pub fn gather(
        bands: &SeverityBands,
        samples: &[Sample],
        flags: &[FaultFlags],
        members: &AreaMembers,
        run_length: usize,
    ) -> Self {
        Self {
            ranks: AreaRankSums::compute(bands, samples, flags, members),
            intra_run: has_run(flags, members, FaultKind::IntraFrequencyHandover, run_length),
            inter_run: has_run(flags, members, FaultKind::InterFrequencyHandover, run_length),
        }
    }

    fn has_handover_run(&self, kind: FaultKind) -> bool {
        match kind {
            FaultKind::IntraFrequencyHandover => self.intra_run,
            FaultKind::InterFrequencyHandover => self.inter_run,
            _ => false,
        }
    }
}

/// At least `run_length` consecutive area members with `kind` set.
pub fn has_run(flags: &[FaultFlags], members: &AreaMembers, kind: FaultKind, run_length: usize) -> bool {
    let mut run = 0usize;
    for &i in &members.indices {
        if flags[i].get(kind) {
            run += 1;
            if run >= run_length {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// Converts area profiles into dominant labels.
#[derive(Debug, Clone)]
pub struct DominantResolver {
    config: ResolutionConfig,
    parallel: bool,
}

impl DominantResolver {
    pub fn new(config: ResolutionConfig, parallel: bool) -> Self {
        Self { config, parallel }
    }

    /// Resolve many areas at once; output order matches input order.
    pub fn resolve_all(
        &self,
        areas: &[(String, AreaEvidence)],
    ) -> Vec<Result<DominantLabel, ProfileError>> {
        let resolve = |(profile, evidence): &(String, AreaEvidence)| self.resolve(profile, evidence);
        if self.parallel {
            areas.par_iter().map(resolve).collect()
        } else {
            areas.iter().map(resolve).collect()
        }
    }

    /// Resolve one area from its rendered profile text.
    pub fn resolve(&self, profile: &str, evidence: &AreaEvidence) -> Result<DominantLabel, ProfileError> {
        let parsed: AreaProfile = profile.parse()?;
        Ok(self.resolve_profile(&parsed, evidence))
    }

    pub fn resolve_profile(&self, profile: &AreaProfile, evidence: &AreaEvidence) -> DominantLabel {
        let entries = match profile {
            AreaProfile::OtherIssues => return DominantLabel::OtherIssues,
            AreaProfile::Ranked(entries) => entries,
        };

        match entries.as_slice() {
            [] => DominantLabel::NoProblemFound,
            [only] => DominantLabel::Fault(only.kind),
            [p1, p2] => DominantLabel::Fault(self.resolve_pair(*p1, *p2, evidence)),
            [p1, p2, p3, ..] => {
                let runner_up = self.resolve_pair(*p2, *p3, evidence);
                let challenger = ProfileEntry {
                    kind: runner_up,
                    percent: profile.percent_of(runner_up),
                };
                DominantLabel::Fault(self.resolve_pair(*p1, challenger, evidence))
            }
        }
    }

    /// Decide between two profile entries. Commutative in its operands.
    pub fn resolve_pair(&self, a: ProfileEntry, b: ProfileEntry, evidence: &AreaEvidence) -> FaultKind {
        if (a.percent - b.percent).abs() > self.config.decisive_gap_percent {
            return if a.percent > b.percent { a.kind } else { b.kind };
        }

        for handover in [FaultKind::IntraFrequencyHandover, FaultKind::InterFrequencyHandover] {
            if (a.kind == handover || b.kind == handover) && evidence.has_handover_run(handover) {
                return handover;
            }
        }

        if let Some(rule) = rule_for(a.kind, b.kind) {
            let rank_a = evidence.ranks.for_kind(a.kind).unwrap_or(0);
            let rank_b = evidence.ranks.for_kind(b.kind).unwrap_or(0);
            return match rank_a.cmp(&rank_b) {
                Ordering::Greater => a.kind,
                Ordering::Less => b.kind,
                Ordering::Equal => self
                    .by_percent(a, b)
                    .unwrap_or(rule.preferred),
            };
        }

        self.by_percent(a, b).unwrap_or_else(|| a.kind.min(b.kind))
    }

    /// Higher percentage, or `None` when equal within the tie epsilon.
    fn by_percent(&self, a: ProfileEntry, b: ProfileEntry) -> Option<FaultKind> {
        let diff = a.percent - b.percent;
        if diff.abs() <= self.config.tie_epsilon {
            None
        } else if diff > 0.0 {
            Some(a.kind)
        } else {
            Some(b.kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use FaultKind::*;

    fn resolver() -> DominantResolver {
        DominantResolver::new(ResolutionConfig::default(), false)
    }

    fn entry(kind: FaultKind, percent: f64) -> ProfileEntry {
        ProfileEntry { kind, percent }
    }

    fn ranks(rsrp: u32, sinr: u32, resource_blocks: u32, distance: u32) -> AreaEvidence {
        AreaEvidence {
            ranks: AreaRankSums {
                rsrp,
                sinr,
                resource_blocks,
                distance,
            },
            ..AreaEvidence::default()
        }
    }

    #[test]
    fn sentinel_and_empty_profiles() {
        let r = resolver();
        let ev = AreaEvidence::default();
        assert_eq!(r.resolve("Other Issues ", &ev), Ok(DominantLabel::OtherIssues));
        assert_eq!(r.resolve("", &ev), Ok(DominantLabel::NoProblemFound));
        assert_eq!(
            r.resolve("High Load: 40%", &ev),
            Ok(DominantLabel::Fault(HighLoad))
        );
    }

    #[test]
    fn decisive_gap_wins_in_either_order() {
        let r = resolver();
        let ev = ranks(0, 0, 99, 0);
        let big = entry(BadCoverage, 80.0);
        let small = entry(HighLoad, 25.0);
        assert_eq!(r.resolve_pair(big, small, &ev), BadCoverage);
        assert_eq!(r.resolve_pair(small, big, &ev), BadCoverage);
    }

    #[test]
    fn handover_run_beats_rank_rules() {
        let r = resolver();
        let ev = AreaEvidence {
            intra_run: true,
            ..ranks(50, 0, 0, 0)
        };
        assert_eq!(
            r.resolve_pair(entry(BadCoverage, 60.0), entry(IntraFrequencyHandover, 40.0), &ev),
            IntraFrequencyHandover
        );
    }

    #[test]
    fn rank_sums_decide_ruled_pairs() {
        let r = resolver();
        let p1 = entry(BadCoverage, 45.0);
        let p2 = entry(HighLoad, 30.0);
        assert_eq!(r.resolve_pair(p1, p2, &ranks(12, 0, 20, 0)), HighLoad);
        assert_eq!(r.resolve_pair(p1, p2, &ranks(21, 0, 20, 0)), BadCoverage);
    }

    #[test]
    fn rank_tie_falls_to_percent_then_preferred() {
        let r = resolver();
        let ev = ranks(0, 6, 0, 6);
        assert_eq!(
            r.resolve_pair(entry(Overshooting, 40.0), entry(Overlapping, 30.0), &ev),
            Overshooting
        );
        assert_eq!(
            r.resolve_pair(entry(Overshooting, 35.0), entry(Overlapping, 35.0), &ev),
            Overlapping
        );
    }

    #[test]
    fn unruled_pair_prefers_larger_share_then_taxonomy() {
        let r = resolver();
        let ev = AreaEvidence::default();
        let intra = entry(IntraFrequencyHandover, 30.0);
        let load = entry(HighLoad, 45.0);
        assert_eq!(r.resolve_pair(intra, load, &ev), HighLoad);
        let tied = entry(HighLoad, 30.0);
        assert_eq!(r.resolve_pair(intra, tied, &ev), IntraFrequencyHandover);
        assert_eq!(r.resolve_pair(tied, intra, &ev), IntraFrequencyHandover);
    }

    #[test]
    fn three_entries_settle_runner_up_first() {
        let r = resolver();
        // Overshooting beats Overlapping on distance, then beats Bad Coverage on rank sums
        let ev = ranks(4, 3, 0, 9);
        let label = r
            .resolve(
                "Bad Coverage: 40%, Overlapping: 35%, Overshooting: 25%",
                &ev,
            )
            .expect("valid profile");
        assert_eq!(label, DominantLabel::Fault(Overshooting));
    }

    #[test]
    fn tied_runner_up_meets_leader_with_its_own_share() {
        let r = resolver();
        let profile = "Bad Coverage: 40%, Overlapping: 30%, High Load: 30%";

        // High Load takes the tied runner-up contest on RB ranks (20 > 5),
        // then its RB ranks also beat the leader's RSRP ranks
        let label = r.resolve(profile, &ranks(12, 5, 20, 0)).expect("valid profile");
        assert_eq!(label, DominantLabel::Fault(HighLoad));

        // Same runner-up, but the leader's RSRP ranks are higher
        let label = r.resolve(profile, &ranks(25, 5, 20, 0)).expect("valid profile");
        assert_eq!(label, DominantLabel::Fault(BadCoverage));

        // Rank sums tie against the leader: High Load carries its 30%, loses to 40%
        let label = r.resolve(profile, &ranks(20, 5, 20, 0)).expect("valid profile");
        assert_eq!(label, DominantLabel::Fault(BadCoverage));
    }

    #[test]
    fn fully_tied_runner_up_falls_to_preferred() {
        let r = resolver();
        let profile = "Overshooting: 40%, Overlapping: 30%, High Load: 30%";
        // Overlapping vs High Load: equal ranks and shares → Overlapping (preferred),
        // then Overlapping vs Overshooting: equal ranks → 40% beats 30%
        let label = r.resolve(profile, &ranks(0, 7, 7, 7)).expect("valid profile");
        assert_eq!(label, DominantLabel::Fault(Overshooting));
        // With a higher SINR sum the preferred runner-up takes the area
        let label = r.resolve(profile, &ranks(0, 9, 9, 7)).expect("valid profile");
        assert_eq!(label, DominantLabel::Fault(Overlapping));
    }

    #[test]
    fn malformed_profile_is_an_error() {
        let r = resolver();
        assert!(r.resolve("Bad Coverage - 40%", &AreaEvidence::default()).is_err());
    }

    #[test]
    fn handover_run_detection() {
        let mut flags = vec![FaultFlags::default(); 6];
        for i in [0, 2, 3] {
            flags[i].intra_handover = true;
        }
        let members = AreaMembers {
            area_id: 1,
            indices: (0..6).collect(),
        };
        assert!(!has_run(&flags, &members, IntraFrequencyHandover, 3));
        flags[4].intra_handover = true;
        assert!(has_run(&flags, &members, IntraFrequencyHandover, 3));
    }
}
