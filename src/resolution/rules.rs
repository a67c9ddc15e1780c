//! Pairwise rule table
//!
//! Each rule covers one unordered pair of rankable categories. The pair is
//! decided by comparing the area rank sums of its two categories; a full tie
//! goes to `preferred`.

use crate::types::FaultKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairRule {
    pub first: FaultKind,
    pub second: FaultKind,
    /// Winner when rank sums and percentages are both tied
    pub preferred: FaultKind,
}

impl PairRule {
    const fn new(first: FaultKind, second: FaultKind, preferred: FaultKind) -> Self {
        Self {
            first,
            second,
            preferred,
        }
    }

    pub fn covers(&self, a: FaultKind, b: FaultKind) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}

pub const PAIR_RULES: [PairRule; 6] = {
    use FaultKind::*;
    [
        PairRule::new(BadCoverage, Overshooting, BadCoverage),
        PairRule::new(BadCoverage, Overlapping, BadCoverage),
        PairRule::new(BadCoverage, HighLoad, BadCoverage),
        PairRule::new(Overshooting, Overlapping, Overlapping),
        PairRule::new(Overshooting, HighLoad, Overshooting),
        PairRule::new(Overlapping, HighLoad, Overlapping),
    ]
};

/// Rule for the unordered pair `{a, b}`, if one exists.
pub fn rule_for(a: FaultKind, b: FaultKind) -> Option<&'static PairRule> {
    PAIR_RULES.iter().find(|r| r.covers(a, b))
}
