//! Reference analysis constants.
//!
//! These are the values used when no config file is present.
//! Grouped by pipeline stage for easy discovery.

// ============================================================================
// Fault Predicates
// ============================================================================

/// Throughput below this marks a sample as underperforming (kbps).
pub const TARGET_THROUGHPUT_KBPS: f64 = 10_000.0;

/// Serving RSRP coverage target (dBm).
pub const TARGET_RSRP_DBM: f64 = -100.0;

/// Serving RSRP floor below which inter-frequency handover is considered (dBm).
pub const MIN_SERVING_RSRP_DBM: f64 = -116.0;

/// Neighbor-over-serving RSRP margin for a missed handover (dB).
pub const NEIGHBOR_MARGIN_DB: f64 = 6.0;

/// Maximum |neighbor − serving| RSRP for an overlapping neighbor (dB).
pub const OVERLAP_WINDOW_DB: f64 = 5.0;

/// SINR below this indicates interference (dB).
pub const MIN_SINR_DB: f64 = 10.0;

/// Resource-block allocation ceiling for high load.
pub const MAX_RESOURCE_BLOCKS: f64 = 30.0;

/// DL PRB utilization above this is high load (%).
pub const UTILIZATION_THRESHOLD_PERCENT: f64 = 80.0;

/// Distance to serving site beyond which a sample is far (m).
pub const MAX_DISTANCE_M: f64 = 500.0;

/// UE transmit power above this is high (dBm).
pub const MAX_UE_TX_POWER_DBM: f64 = 20.0;

// ============================================================================
// Segmentation
// ============================================================================

/// Smallest surviving problem area (samples).
pub const MIN_AREA_SAMPLES: usize = 7;

/// Run length at which a new area is started (samples).
pub const MAX_AREA_SAMPLES: usize = 15;

/// Time gap that splits consecutive underperforming samples (seconds).
pub const MAX_GAP_SECONDS: f64 = 4.0;

// ============================================================================
// Aggregation
// ============================================================================

/// Categories must exceed this share to enter an area profile (%).
pub const MIN_SHARE_PERCENT: f64 = 20.0;

/// Profile length.
pub const PROFILE_TOP_N: usize = 3;

// ============================================================================
// Resolution
// ============================================================================

/// Percentage lead that decides a pair without consulting ranks.
pub const DECISIVE_GAP_PERCENT: f64 = 50.0;

/// Consecutive handover samples that make the handover category win.
pub const HANDOVER_RUN_LENGTH: usize = 3;

/// Percentages closer than this are equal.
pub const TIE_EPSILON: f64 = 1e-6;

/// Quantile levels for the RSRP and SINR severity bands.
pub const QUANTILE_LEVELS: [f64; 5] = [0.2, 0.4, 0.6, 0.8, 1.0];

/// Upper edges of the resource-block rank bands (rank 5 at the first edge).
pub const RESOURCE_BLOCK_EDGES: [f64; 5] = [10.0, 15.0, 20.0, 25.0, 30.0];

/// Distance band edges, in multiples of the median inter-site distance.
pub const DISTANCE_MULTIPLES: [f64; 5] = [2.0, 3.0, 4.0, 5.0, 6.0];
