//! JSON survey document and conversion into pipeline inputs
//!
//! Column normalization and geographic lookups happen upstream; this module
//! only parses timestamps and fills in the far/high-power flag when absent.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AnalysisConfig;
use crate::error::PipelineError;
use crate::types::{CapacityRow, CapacityTable, Neighbor, Sample, ServingCell, MAX_NEIGHBORS};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// Top-level input document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyInput {
    /// Corpus median inter-site distance (m)
    pub median_site_distance_m: f64,
    #[serde(default)]
    pub capacity: Vec<CapacityRow>,
    pub samples: Vec<SampleRecord>,
}

/// One drive-test record as exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    pub date: String,
    pub time: String,
    pub throughput_kbps: f64,
    pub rsrp_dbm: f64,
    pub sinr_db: f64,
    pub rsrq_db: f64,
    pub earfcn: u32,
    pub pci: u32,
    pub enodeb_id: u32,
    pub resource_blocks: f64,
    pub tx_power_dbm: f64,
    pub distance_to_site_m: f64,
    #[serde(default)]
    pub far_high_power: Option<bool>,
    #[serde(default)]
    pub neighbors: Vec<Neighbor>,
}

/// Inputs ready for `FaultPipeline::run`.
#[derive(Debug, Clone)]
pub struct PreparedSurvey {
    pub samples: Vec<Sample>,
    pub capacity: CapacityTable,
    pub median_site_distance_m: f64,
}

impl SurveyInput {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Parse timestamps and derive missing flags. Any bad record is fatal.
    pub fn prepare(self, config: &AnalysisConfig) -> Result<PreparedSurvey, PipelineError> {
        let samples = self
            .samples
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.into_sample(index, config))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PreparedSurvey {
            samples,
            capacity: CapacityTable::from_rows(self.capacity),
            median_site_distance_m: self.median_site_distance_m,
        })
    }
}

impl SampleRecord {
    fn into_sample(self, index: usize, config: &AnalysisConfig) -> Result<Sample, PipelineError> {
        let timestamp = parse_timestamp(&self.date, &self.time).ok_or_else(|| {
            PipelineError::InvalidTimestamp {
                index,
                value: format!("{} {}", self.date, self.time),
            }
        })?;

        let far_high_power = self.far_high_power.unwrap_or_else(|| {
            let d = &config.thresholds.distance;
            self.throughput_kbps < config.thresholds.throughput.target_kbps
                && self.distance_to_site_m > d.max_distance_m
                && self.tx_power_dbm > d.max_ue_tx_power_dbm
        });

        let mut neighbors = self.neighbors;
        if neighbors.len() > MAX_NEIGHBORS {
            warn!(record = index, reported = neighbors.len(), "Extra neighbor reports dropped");
            neighbors.truncate(MAX_NEIGHBORS);
        }

        Ok(Sample {
            timestamp,
            throughput_kbps: self.throughput_kbps,
            serving: ServingCell {
                rsrp_dbm: self.rsrp_dbm,
                sinr_db: self.sinr_db,
                rsrq_db: self.rsrq_db,
                earfcn: self.earfcn,
                pci: self.pci,
                enodeb_id: self.enodeb_id,
                resource_blocks: self.resource_blocks,
                tx_power_dbm: self.tx_power_dbm,
            },
            neighbors,
            distance_to_site_m: self.distance_to_site_m,
            far_high_power,
        })
    }
}

/// Combine a `YYYY-MM-DD` or `MM/DD/YYYY` date with an `HH:MM:SS[.fff]` time.
pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(date.trim(), f).ok())?;
    let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT).ok()?;
    Some(date.and_time(time))
}
