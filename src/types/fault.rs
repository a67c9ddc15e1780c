//! Fault taxonomy and per-sample fault flags

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Root-cause categories, in canonical (taxonomy) order.
///
/// The declaration order is load-bearing: it breaks percentage ties when
/// profiles are ranked and when the resolver falls back to the first operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FaultKind {
    BadCoverage,
    IntraFrequencyHandover,
    InterFrequencyHandover,
    Overshooting,
    Overlapping,
    HighLoad,
}

impl FaultKind {
    pub const ALL: [FaultKind; 6] = [
        FaultKind::BadCoverage,
        FaultKind::IntraFrequencyHandover,
        FaultKind::InterFrequencyHandover,
        FaultKind::Overshooting,
        FaultKind::Overlapping,
        FaultKind::HighLoad,
    ];

    /// Report label, as it appears in profiles and dominant labels.
    pub const fn label(self) -> &'static str {
        match self {
            Self::BadCoverage => "Bad Coverage",
            Self::IntraFrequencyHandover => "Intra-Frequency Handover",
            Self::InterFrequencyHandover => "Inter-Frequency Handover",
            Self::Overshooting => "Overshooting",
            Self::Overlapping => "Overlapping",
            Self::HighLoad => "High Load",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unknown category label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fault category '{0}'")]
pub struct UnknownFaultKind(pub String);

impl FromStr for FaultKind {
    type Err = UnknownFaultKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.label() == s)
            .ok_or_else(|| UnknownFaultKind(s.to_string()))
    }
}

/// The six predicate outcomes for one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultFlags {
    pub bad_coverage: bool,
    pub intra_handover: bool,
    pub inter_handover: bool,
    pub overshooting: bool,
    pub overlapping: bool,
    pub high_load: bool,
}

impl FaultFlags {
    pub const fn get(&self, kind: FaultKind) -> bool {
        match kind {
            FaultKind::BadCoverage => self.bad_coverage,
            FaultKind::IntraFrequencyHandover => self.intra_handover,
            FaultKind::InterFrequencyHandover => self.inter_handover,
            FaultKind::Overshooting => self.overshooting,
            FaultKind::Overlapping => self.overlapping,
            FaultKind::HighLoad => self.high_load,
        }
    }

    pub fn set(&mut self, kind: FaultKind, value: bool) {
        let slot = match kind {
            FaultKind::BadCoverage => &mut self.bad_coverage,
            FaultKind::IntraFrequencyHandover => &mut self.intra_handover,
            FaultKind::InterFrequencyHandover => &mut self.inter_handover,
            FaultKind::Overshooting => &mut self.overshooting,
            FaultKind::Overlapping => &mut self.overlapping,
            FaultKind::HighLoad => &mut self.high_load,
        };
        *slot = value;
    }

    /// Either handover predicate fired.
    pub const fn any_handover(&self) -> bool {
        self.intra_handover || self.inter_handover
    }

    /// Number of predicates that fired.
    pub fn total(&self) -> usize {
        FaultKind::ALL.iter().filter(|k| self.get(**k)).count()
    }
}

/// Overlapping side output: implicated cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapReport {
    /// Qualifying neighbors, +1 for the serving cell when Overlapping fired
    pub count: usize,
    /// Implicated cell identities, sorted as strings, no duplicates
    pub cell_ids: BTreeSet<String>,
}

impl OverlapReport {
    /// Comma-joined id list, or `"None"` when empty.
    pub fn cell_list(&self) -> String {
        if self.cell_ids.is_empty() {
            "None".to_string()
        } else {
            self.cell_ids
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}
