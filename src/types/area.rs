//! Problem areas: ids, profiles, dominant labels and the first-row side-table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::FaultKind;

/// Area id. 0 means "no problem"; positive ids are dense from 1.
pub type AreaId = u32;

/// Area id assigned to samples outside any problem area.
pub const NO_AREA: AreaId = 0;

/// Profile text emitted when no category clears the minimum share.
///
/// The trailing space is part of the wire format: it distinguishes the
/// aggregated profile from the resolver's `Other Issues` label.
pub const OTHER_ISSUES_PROFILE: &str = "Other Issues ";

/// One ranked profile entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub kind: FaultKind,
    /// Share of area samples on which the predicate fired (0-100)
    pub percent: f64,
}

/// Ordered top-N summary of an area's fault shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AreaProfile {
    /// Categories above the minimum share, descending by percentage
    Ranked(Vec<ProfileEntry>),
    /// Nothing cleared the minimum share
    OtherIssues,
}

/// Malformed profile text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("profile entry '{0}' is missing the ': ' separator")]
    MissingSeparator(String),

    #[error("profile entry '{entry}': {source}")]
    UnknownCategory {
        entry: String,
        source: super::fault::UnknownFaultKind,
    },

    #[error("profile entry '{0}' has an invalid percentage")]
    InvalidPercent(String),
}

impl AreaProfile {
    /// Ranked entries (empty for `OtherIssues`).
    pub fn entries(&self) -> &[ProfileEntry] {
        match self {
            Self::Ranked(entries) => entries,
            Self::OtherIssues => &[],
        }
    }

    /// Stored percentage for `kind`, 0 when the category is not listed.
    pub fn percent_of(&self, kind: FaultKind) -> f64 {
        self.entries()
            .iter()
            .find(|e| e.kind == kind)
            .map_or(0.0, |e| e.percent)
    }
}

/// Round to two decimals; `Display` then drops trailing zeros (45 → "45").
pub fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl fmt::Display for AreaProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OtherIssues => f.write_str(OTHER_ISSUES_PROFILE),
            Self::Ranked(entries) => {
                for (i, e) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}%", e.kind, round_percent(e.percent))?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for AreaProfile {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == OTHER_ISSUES_PROFILE {
            return Ok(Self::OtherIssues);
        }
        if s.is_empty() {
            return Ok(Self::Ranked(Vec::new()));
        }

        let mut entries = Vec::new();
        for item in s.split(", ") {
            let (name, pct) = item
                .split_once(": ")
                .ok_or_else(|| ProfileError::MissingSeparator(item.to_string()))?;
            let kind = name
                .parse::<FaultKind>()
                .map_err(|source| ProfileError::UnknownCategory {
                    entry: item.to_string(),
                    source,
                })?;
            let percent = pct
                .trim_end_matches('%')
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite())
                .ok_or_else(|| ProfileError::InvalidPercent(item.to_string()))?;
            entries.push(ProfileEntry { kind, percent });
        }
        Ok(Self::Ranked(entries))
    }
}

/// Resolved root cause for an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DominantLabel {
    Fault(FaultKind),
    OtherIssues,
    NoProblemFound,
}

impl fmt::Display for DominantLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fault(kind) => f.write_str(kind.label()),
            Self::OtherIssues => f.write_str("Other Issues"),
            Self::NoProblemFound => f.write_str("No Problem Found"),
        }
    }
}

/// Per-area aggregate counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaStats {
    pub area_id: AreaId,
    /// Index (in sorted order) of the area's first sample
    pub first_index: usize,
    /// Number of member samples
    pub size: usize,
    /// True-counts per category, indexed by `FaultKind::index()`
    pub counts: [usize; 6],
}

impl AreaStats {
    /// Share of member samples on which `kind` fired (0-100).
    pub fn percent(&self, kind: FaultKind) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        self.counts[kind.index()] as f64 / self.size as f64 * 100.0
    }
}

/// Side-table row for one area. Surfaced only on the area's first sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaAnnotation {
    pub stats: AreaStats,
    /// Rendered profile text (`"Name: pct%, ..."` or `"Other Issues "`)
    pub profile: String,
    /// `None` when the profile could not be resolved
    pub dominant: Option<DominantLabel>,
}
