//! Analysis Configuration Module
//!
//! Provides the run configuration loaded from TOML files, so every fault
//! threshold is operator-tunable.
//!
//! ## Loading Order
//!
//! 1. `FAULTLINE_CONFIG` environment variable (path to TOML file)
//! 2. `faultline.toml` in the current working directory
//! 3. Built-in defaults (the reference constants in [`defaults`])
//!
//! ## Usage
//!
//! The config is passed explicitly into the pipeline; there is no global.
//!
//! ```ignore
//! let config = AnalysisConfig::load();
//! let report = FaultPipeline::new(config)?.run(samples, &capacity, 450.0)?;
//! ```

mod analysis_config;
pub mod defaults;
pub mod validation;

pub use analysis_config::*;
