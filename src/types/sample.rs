//! Drive-test measurement samples

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Maximum number of neighbor cells reported per sample.
pub const MAX_NEIGHBORS: usize = 4;

/// One neighbor cell as reported by the scanner. Any field may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Neighbor RSRP (dBm)
    #[serde(default)]
    pub rsrp_dbm: Option<f64>,
    /// Neighbor DL EARFCN
    #[serde(default)]
    pub earfcn: Option<u32>,
    /// Neighbor physical cell identity
    #[serde(default)]
    pub pci: Option<u32>,
}

impl Neighbor {
    pub fn new(rsrp_dbm: f64, earfcn: u32, pci: u32) -> Self {
        Self {
            rsrp_dbm: Some(rsrp_dbm),
            earfcn: Some(earfcn),
            pci: Some(pci),
        }
    }

    /// Neighbor with every field reported (required by the overlap scan).
    pub fn complete(&self) -> Option<(f64, u32, u32)> {
        Some((self.rsrp_dbm?, self.earfcn?, self.pci?))
    }
}

/// Serving-cell KPIs for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServingCell {
    /// Serving cell RSRP (dBm)
    pub rsrp_dbm: f64,
    /// Serving cell RS SINR (dB)
    pub sinr_db: f64,
    /// Serving cell RSRQ (dB)
    pub rsrq_db: f64,
    /// Serving DL EARFCN
    pub earfcn: u32,
    /// Serving physical cell identity
    pub pci: u32,
    /// eNodeB part of the cell identity
    pub enodeb_id: u32,
    /// Number of PDSCH resource blocks allocated
    pub resource_blocks: f64,
    /// UE PUSCH transmit power (dBm)
    pub tx_power_dbm: f64,
}

/// A single drive-test sample. Immutable once built; the pipeline never
/// writes to it, results live alongside in `AnnotatedSample`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Measurement time (date + time of day)
    pub timestamp: NaiveDateTime,
    /// PDSCH physical-layer throughput (kbps)
    pub throughput_kbps: f64,
    pub serving: ServingCell,
    /// Up to four neighbor reports, in N1..N4 order
    pub neighbors: Vec<Neighbor>,
    /// Distance from the sample position to the serving site (m)
    pub distance_to_site_m: f64,
    /// Far from site while transmitting at high power (derived upstream)
    pub far_high_power: bool,
}

impl Sample {
    /// Throughput below the configured target.
    pub fn is_underperforming(&self, target_kbps: f64) -> bool {
        self.throughput_kbps < target_kbps
    }

    /// Neighbor RSRP values padded to four slots; unreported slots are `None`.
    pub fn neighbor_rsrps(&self) -> [Option<f64>; MAX_NEIGHBORS] {
        let mut out = [None; MAX_NEIGHBORS];
        for (slot, n) in out.iter_mut().zip(self.neighbors.iter()) {
            *slot = n.rsrp_dbm;
        }
        out
    }

    /// True when every one of the four neighbor slots is below `target`.
    ///
    /// An unreported slot has no value to compare and is not below, so any
    /// missing neighbor makes this false.
    pub fn all_neighbors_below(&self, target_dbm: f64) -> bool {
        self.neighbor_rsrps()
            .iter()
            .all(|r| r.is_some_and(|v| v < target_dbm))
    }

    /// Names the first non-finite required KPI, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        let fields = [
            ("throughput_kbps", self.throughput_kbps),
            ("rsrp_dbm", self.serving.rsrp_dbm),
            ("sinr_db", self.serving.sinr_db),
            ("rsrq_db", self.serving.rsrq_db),
            ("resource_blocks", self.serving.resource_blocks),
            ("tx_power_dbm", self.serving.tx_power_dbm),
            ("distance_to_site_m", self.distance_to_site_m),
        ];
        fields
            .into_iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(name, _)| name)
    }
}
