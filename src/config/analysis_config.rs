//! Analysis Configuration - Every fault-analysis threshold as a TOML value
//!
//! Each struct implements `Default` with the reference constants, so a run
//! with no config file behaves exactly like the built-in analyzer.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "FAULTLINE_CONFIG";

/// Config file picked up from the working directory.
pub const LOCAL_CONFIG_FILE: &str = "faultline.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one analysis run.
///
/// Load with `AnalysisConfig::load()` which searches:
/// 1. `$FAULTLINE_CONFIG` env var
/// 2. `./faultline.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Survey identification
    #[serde(default)]
    pub survey: SurveyInfo,

    /// Fault predicate thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Problem-area segmentation
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Area profile construction
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Dominant-label resolution
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Execution options
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl AnalysisConfig {
    /// Load configuration using the standard search order:
    /// 1. `$FAULTLINE_CONFIG` environment variable
    /// 2. `./faultline.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), survey = %config.survey.name, "Loaded analysis config from FAULTLINE_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from FAULTLINE_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "FAULTLINE_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(survey = %config.survey.name, "Loaded analysis config from ./faultline.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./faultline.toml, using defaults");
                }
            }
        }

        info!("No faultline.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate TOML text. Unknown keys are logged, not rejected.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all thresholds for internal consistency.
    ///
    /// Rules:
    /// - Area size bounds must be ordered and non-zero
    /// - The serving-RSRP floor must sit below the coverage target
    /// - Band edges and quantile levels must be strictly ascending
    /// - Every numeric value must be finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        for (name, value) in self.numeric_fields() {
            if !value.is_finite() {
                errors.push(format!("{name} must be a finite number (got {value})"));
            }
        }

        let s = &self.segmentation;
        if s.min_area_samples == 0 {
            errors.push("segmentation.min_area_samples must be > 0".to_string());
        }
        if s.min_area_samples > s.max_area_samples {
            errors.push(format!(
                "segmentation.min_area_samples ({}) must be <= max_area_samples ({})",
                s.min_area_samples, s.max_area_samples
            ));
        }
        if s.max_gap_seconds < 0.0 {
            errors.push(format!(
                "segmentation.max_gap_seconds ({:.1}) cannot be negative",
                s.max_gap_seconds
            ));
        }

        let cov = &self.thresholds.coverage;
        if cov.min_serving_rsrp_dbm >= cov.target_rsrp_dbm {
            errors.push(format!(
                "coverage.min_serving_rsrp_dbm ({:.1}) must be below target_rsrp_dbm ({:.1})",
                cov.min_serving_rsrp_dbm, cov.target_rsrp_dbm
            ));
        }
        if self.thresholds.handover.neighbor_margin_db < 0.0 {
            errors.push("handover.neighbor_margin_db cannot be negative".to_string());
        }
        if self.thresholds.overlap.window_db < 0.0 {
            errors.push("overlap.window_db cannot be negative".to_string());
        }

        let a = &self.aggregation;
        if !(a.min_share_percent > 0.0 && a.min_share_percent < 100.0) {
            errors.push(format!(
                "aggregation.min_share_percent ({:.1}) must be within (0, 100)",
                a.min_share_percent
            ));
        }
        if a.top_n == 0 {
            errors.push("aggregation.top_n must be > 0".to_string());
        }

        let r = &self.resolution;
        Self::check_ascending(&r.quantile_levels, "resolution.quantile_levels", &mut errors);
        if r.quantile_levels.iter().any(|q| !(*q > 0.0 && *q <= 1.0)) {
            errors.push("resolution.quantile_levels must lie within (0, 1]".to_string());
        }
        Self::check_ascending(
            &r.resource_block_edges,
            "resolution.resource_block_edges",
            &mut errors,
        );
        Self::check_ascending(
            &r.distance_multiples,
            "resolution.distance_multiples",
            &mut errors,
        );
        if r.handover_run_length == 0 {
            errors.push("resolution.handover_run_length must be > 0".to_string());
        }
        if r.decisive_gap_percent < 0.0 {
            errors.push("resolution.decisive_gap_percent cannot be negative".to_string());
        }
        if r.tie_epsilon < 0.0 {
            errors.push("resolution.tie_epsilon cannot be negative".to_string());
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_ascending(values: &[f64], name: &str, errors: &mut Vec<String>) {
        if values.is_empty() {
            errors.push(format!("{name} must not be empty"));
            return;
        }
        if values.windows(2).any(|w| w[0] >= w[1]) {
            errors.push(format!("{name} must be strictly ascending (got {values:?})"));
        }
    }

    /// Every floating-point setting with its dotted key.
    fn numeric_fields(&self) -> Vec<(String, f64)> {
        let t = &self.thresholds;
        let mut fields: Vec<(String, f64)> = vec![
            ("thresholds.throughput.target_kbps".into(), t.throughput.target_kbps),
            ("thresholds.coverage.target_rsrp_dbm".into(), t.coverage.target_rsrp_dbm),
            ("thresholds.coverage.min_serving_rsrp_dbm".into(), t.coverage.min_serving_rsrp_dbm),
            ("thresholds.handover.neighbor_margin_db".into(), t.handover.neighbor_margin_db),
            ("thresholds.overlap.window_db".into(), t.overlap.window_db),
            ("thresholds.overlap.min_sinr_db".into(), t.overlap.min_sinr_db),
            ("thresholds.load.max_resource_blocks".into(), t.load.max_resource_blocks),
            ("thresholds.load.utilization_threshold_percent".into(), t.load.utilization_threshold_percent),
            ("thresholds.distance.max_distance_m".into(), t.distance.max_distance_m),
            ("thresholds.distance.max_ue_tx_power_dbm".into(), t.distance.max_ue_tx_power_dbm),
            ("segmentation.max_gap_seconds".into(), self.segmentation.max_gap_seconds),
            ("aggregation.min_share_percent".into(), self.aggregation.min_share_percent),
            ("resolution.decisive_gap_percent".into(), self.resolution.decisive_gap_percent),
            ("resolution.tie_epsilon".into(), self.resolution.tie_epsilon),
        ];
        let r = &self.resolution;
        for (name, list) in [
            ("resolution.quantile_levels", &r.quantile_levels),
            ("resolution.resource_block_edges", &r.resource_block_edges),
            ("resolution.distance_multiples", &r.distance_multiples),
        ] {
            fields.extend(list.iter().enumerate().map(|(i, v)| (format!("{name}[{i}]"), *v)));
        }
        fields
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Survey Info
// ============================================================================

/// Identification metadata, used only in logs and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyInfo {
    /// Survey / campaign name
    #[serde(default = "default_survey_name")]
    pub name: String,

    /// Region or cluster name
    #[serde(default)]
    pub region: String,
}

fn default_survey_name() -> String {
    "DEFAULT".to_string()
}

impl Default for SurveyInfo {
    fn default() -> Self {
        Self {
            name: default_survey_name(),
            region: String::new(),
        }
    }
}

// ============================================================================
// Threshold Config (master container)
// ============================================================================

/// All fault predicate thresholds, grouped by concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default)]
    pub throughput: ThroughputThresholds,

    #[serde(default)]
    pub coverage: CoverageThresholds,

    #[serde(default)]
    pub handover: HandoverThresholds,

    #[serde(default)]
    pub overlap: OverlapThresholds,

    #[serde(default)]
    pub load: LoadThresholds,

    #[serde(default)]
    pub distance: DistanceThresholds,
}

// ============================================================================
// Throughput
// ============================================================================

/// A sample is underperforming when its throughput is below the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputThresholds {
    /// Target PDSCH throughput (kbps).
    #[serde(default = "default_target_kbps")]
    pub target_kbps: f64,
}

fn default_target_kbps() -> f64 { defaults::TARGET_THROUGHPUT_KBPS }

impl Default for ThroughputThresholds {
    fn default() -> Self {
        Self {
            target_kbps: default_target_kbps(),
        }
    }
}

// ============================================================================
// Coverage
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageThresholds {
    /// Serving RSRP below this is poor coverage (dBm).
    #[serde(default = "default_target_rsrp")]
    pub target_rsrp_dbm: f64,

    /// Serving RSRP floor gating inter-frequency handover (dBm).
    #[serde(default = "default_min_serving_rsrp")]
    pub min_serving_rsrp_dbm: f64,
}

fn default_target_rsrp() -> f64 { defaults::TARGET_RSRP_DBM }
fn default_min_serving_rsrp() -> f64 { defaults::MIN_SERVING_RSRP_DBM }

impl Default for CoverageThresholds {
    fn default() -> Self {
        Self {
            target_rsrp_dbm: default_target_rsrp(),
            min_serving_rsrp_dbm: default_min_serving_rsrp(),
        }
    }
}

// ============================================================================
// Handover
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoverThresholds {
    /// A neighbor this much stronger than the serving cell is a missed handover (dB).
    #[serde(default = "default_neighbor_margin")]
    pub neighbor_margin_db: f64,
}

fn default_neighbor_margin() -> f64 { defaults::NEIGHBOR_MARGIN_DB }

impl Default for HandoverThresholds {
    fn default() -> Self {
        Self {
            neighbor_margin_db: default_neighbor_margin(),
        }
    }
}

// ============================================================================
// Overlap
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapThresholds {
    /// Neighbors within this RSRP distance of the serving cell overlap it (dB).
    #[serde(default = "default_overlap_window")]
    pub window_db: f64,

    /// SINR below this indicates interference (dB).
    #[serde(default = "default_min_sinr")]
    pub min_sinr_db: f64,
}

fn default_overlap_window() -> f64 { defaults::OVERLAP_WINDOW_DB }
fn default_min_sinr() -> f64 { defaults::MIN_SINR_DB }

impl Default for OverlapThresholds {
    fn default() -> Self {
        Self {
            window_db: default_overlap_window(),
            min_sinr_db: default_min_sinr(),
        }
    }
}

// ============================================================================
// Load
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadThresholds {
    /// Allocations below this many resource blocks suggest congestion.
    #[serde(default = "default_max_resource_blocks")]
    pub max_resource_blocks: f64,

    /// Cell DL PRB utilization above this is high load (%).
    #[serde(default = "default_utilization_threshold")]
    pub utilization_threshold_percent: f64,
}

fn default_max_resource_blocks() -> f64 { defaults::MAX_RESOURCE_BLOCKS }
fn default_utilization_threshold() -> f64 { defaults::UTILIZATION_THRESHOLD_PERCENT }

impl Default for LoadThresholds {
    fn default() -> Self {
        Self {
            max_resource_blocks: default_max_resource_blocks(),
            utilization_threshold_percent: default_utilization_threshold(),
        }
    }
}

// ============================================================================
// Distance
// ============================================================================

/// Used to derive `far_high_power` when the input omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceThresholds {
    /// Distance to serving site beyond which a sample is "far" (m).
    #[serde(default = "default_max_distance")]
    pub max_distance_m: f64,

    /// UE transmit power above this is "high" (dBm).
    #[serde(default = "default_max_ue_tx_power")]
    pub max_ue_tx_power_dbm: f64,
}

fn default_max_distance() -> f64 { defaults::MAX_DISTANCE_M }
fn default_max_ue_tx_power() -> f64 { defaults::MAX_UE_TX_POWER_DBM }

impl Default for DistanceThresholds {
    fn default() -> Self {
        Self {
            max_distance_m: default_max_distance(),
            max_ue_tx_power_dbm: default_max_ue_tx_power(),
        }
    }
}

// ============================================================================
// Segmentation
// ============================================================================

/// How interior non-underperforming samples inside an area are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPolicy {
    /// Leave them at area 0.
    #[default]
    Keep,
    /// Absorb a single area-0 sample whose neighbors share a positive id.
    Close,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Areas smaller than this are dissolved.
    #[serde(default = "default_min_area_samples")]
    pub min_area_samples: usize,

    /// A run reaching this length starts a new area.
    #[serde(default = "default_max_area_samples")]
    pub max_area_samples: usize,

    /// A larger time gap between underperforming samples starts a new area (s).
    #[serde(default = "default_max_gap_seconds")]
    pub max_gap_seconds: f64,

    #[serde(default)]
    pub gap_policy: GapPolicy,
}

fn default_min_area_samples() -> usize { defaults::MIN_AREA_SAMPLES }
fn default_max_area_samples() -> usize { defaults::MAX_AREA_SAMPLES }
fn default_max_gap_seconds() -> f64 { defaults::MAX_GAP_SECONDS }

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_area_samples: default_min_area_samples(),
            max_area_samples: default_max_area_samples(),
            max_gap_seconds: default_max_gap_seconds(),
            gap_policy: GapPolicy::default(),
        }
    }
}

// ============================================================================
// Aggregation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Categories at or below this share are left out of the profile (%).
    #[serde(default = "default_min_share")]
    pub min_share_percent: f64,

    /// Maximum number of profile entries.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_min_share() -> f64 { defaults::MIN_SHARE_PERCENT }
fn default_top_n() -> usize { defaults::PROFILE_TOP_N }

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            min_share_percent: default_min_share(),
            top_n: default_top_n(),
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// A percentage lead larger than this decides a pair outright.
    #[serde(default = "default_decisive_gap")]
    pub decisive_gap_percent: f64,

    /// Consecutive handover samples that make a handover category win.
    #[serde(default = "default_handover_run_length")]
    pub handover_run_length: usize,

    /// Percentages closer than this are treated as equal.
    #[serde(default = "default_tie_epsilon")]
    pub tie_epsilon: f64,

    /// Quantile levels for the RSRP and SINR severity bands.
    #[serde(default = "default_quantile_levels")]
    pub quantile_levels: Vec<f64>,

    /// Upper edges of the resource-block rank bands, ascending.
    #[serde(default = "default_resource_block_edges")]
    pub resource_block_edges: Vec<f64>,

    /// Distance band edges as multiples of the median inter-site distance.
    #[serde(default = "default_distance_multiples")]
    pub distance_multiples: Vec<f64>,
}

fn default_decisive_gap() -> f64 { defaults::DECISIVE_GAP_PERCENT }
fn default_handover_run_length() -> usize { defaults::HANDOVER_RUN_LENGTH }
fn default_tie_epsilon() -> f64 { defaults::TIE_EPSILON }
fn default_quantile_levels() -> Vec<f64> { defaults::QUANTILE_LEVELS.to_vec() }
fn default_resource_block_edges() -> Vec<f64> { defaults::RESOURCE_BLOCK_EDGES.to_vec() }
fn default_distance_multiples() -> Vec<f64> { defaults::DISTANCE_MULTIPLES.to_vec() }

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            decisive_gap_percent: default_decisive_gap(),
            handover_run_length: default_handover_run_length(),
            tie_epsilon: default_tie_epsilon(),
            quantile_levels: default_quantile_levels(),
            resource_block_edges: default_resource_block_edges(),
            distance_multiples: default_distance_multiples(),
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run detection, aggregation and resolution on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_parallel() -> bool { true }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
