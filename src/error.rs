//! Fatal and soft error types for an analysis run

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::types::{AreaId, CellIdentity};

/// Errors that abort a run. A run that fails produces no partial report.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("record {index}: invalid timestamp '{value}'")]
    InvalidTimestamp { index: usize, value: String },

    #[error("record {index}: {field} is not a finite number")]
    NonFiniteKpi { index: usize, field: &'static str },

    #[error("median site distance must be a positive finite number (got {0})")]
    InvalidSiteDistance(f64),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A recoverable failure recorded during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SoftFailure {
    /// Capacity lookup failed; High Load was taken as false for the sample
    Utilization {
        sample_index: usize,
        cell: CellIdentity,
        reason: String,
    },
    /// Profile could not be parsed; the area has no dominant label
    Profile {
        area_id: AreaId,
        profile: String,
        reason: String,
    },
}

/// Soft failures collected over one run, in sample / area order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub failures: Vec<SoftFailure>,
}

impl Diagnostics {
    pub fn push(&mut self, failure: SoftFailure) {
        self.failures.push(failure);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn utilization_failures(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| matches!(f, SoftFailure::Utilization { .. }))
            .count()
    }

    pub fn profile_failures(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| matches!(f, SoftFailure::Profile { .. }))
            .count()
    }
}
