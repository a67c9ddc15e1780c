//! Cell capacity (PRB utilization) lookup table

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use super::Sample;

/// Serving-cell identity used to join samples against the capacity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellIdentity {
    pub enodeb_id: u32,
    pub pci: u32,
    pub earfcn: u32,
}

impl CellIdentity {
    pub fn serving(sample: &Sample) -> Self {
        Self {
            enodeb_id: sample.serving.enodeb_id,
            pci: sample.serving.pci,
            earfcn: sample.serving.earfcn,
        }
    }
}

/// One row of the capacity export. Utilization is kept as reported text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityRow {
    pub enodeb_id: u32,
    pub pci: u32,
    pub earfcn: u32,
    /// DL PRB utilization (%), as reported
    pub utilization: String,
}

/// Utilization lookup failures. These are soft: High Load is simply false.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("no utilization entry for eNB {}/PCI {}/EARFCN {}", .0.enodeb_id, .0.pci, .0.earfcn)]
    Missing(CellIdentity),

    #[error("unparseable utilization '{value}' for PCI {}", .cell.pci)]
    Unparseable { cell: CellIdentity, value: String },
}

/// In-memory capacity table, resolved before the pipeline runs.
#[derive(Debug, Clone, Default)]
pub struct CapacityTable {
    entries: HashMap<CellIdentity, String>,
}

impl CapacityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// First row wins when a cell is listed more than once.
    pub fn from_rows<I: IntoIterator<Item = CapacityRow>>(rows: I) -> Self {
        let mut entries = HashMap::new();
        for row in rows {
            entries
                .entry(CellIdentity {
                    enodeb_id: row.enodeb_id,
                    pci: row.pci,
                    earfcn: row.earfcn,
                })
                .or_insert(row.utilization);
        }
        Self { entries }
    }

    pub fn insert(&mut self, cell: CellIdentity, utilization: impl Into<String>) {
        self.entries.insert(cell, utilization.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Utilization percentage for `cell`.
    pub fn utilization(&self, cell: &CellIdentity) -> Result<f64, CapacityError> {
        let raw = self
            .entries
            .get(cell)
            .ok_or(CapacityError::Missing(*cell))?;
        raw.trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CapacityError::Unparseable {
                cell: *cell,
                value: raw.clone(),
            })
    }
}
