//! FAULTLINE - drive-test fault analyzer
//!
//! Segments a drive-test survey into problem areas and labels each area with
//! its dominant root cause.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a survey and write the JSON report
//! faultline analyze --input survey.json --output report.json
//!
//! # Validate a config file and print the effective settings
//! faultline check-config --config faultline.toml
//!
//! # Print the built-in defaults as TOML
//! faultline defaults
//! ```
//!
//! # Environment Variables
//!
//! - `FAULTLINE_CONFIG`: Path to the analysis config (default: ./faultline.toml)
//! - `RUST_LOG`: Logging level (default: info)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use faultline::{AnalysisConfig, AnalysisReport, FaultPipeline, SurveyInput};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "faultline")]
#[command(about = "FAULTLINE drive-test fault-area segmentation and classification")]
#[command(version)]
struct CliArgs {
    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the analysis pipeline over a survey document
    Analyze {
        /// Survey JSON document
        #[arg(long, short)]
        input: PathBuf,
        /// Analysis config (falls back to FAULTLINE_CONFIG, then ./faultline.toml)
        #[arg(long, short)]
        config: Option<PathBuf>,
        /// Where to write the JSON report
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Load and validate a config, then print the effective TOML
    CheckConfig {
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Print the built-in default config as TOML
    Defaults,
}

// ============================================================================
// Report Document
// ============================================================================

#[derive(Serialize)]
struct Summary {
    samples: usize,
    areas: usize,
    problem_area_samples: usize,
    problem_free_samples: usize,
    dominant: BTreeMap<String, usize>,
    soft_failures: usize,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    survey: &'a str,
    summary: Summary,
    areas: Vec<&'a faultline::AreaAnnotation>,
    areas_by_dominant: BTreeMap<String, Vec<usize>>,
    rows: Vec<faultline::pipeline::ReportRow>,
    diagnostics: &'a faultline::Diagnostics,
}

fn summarize(report: &AnalysisReport) -> Summary {
    Summary {
        samples: report.samples.len(),
        areas: report.area_count(),
        problem_area_samples: report.problem_areas().len(),
        problem_free_samples: report.problem_free().len(),
        dominant: report.dominant_counts(),
        soft_failures: report.diagnostics().len(),
    }
}

fn to_document(report: &AnalysisReport) -> ReportDocument<'_> {
    ReportDocument {
        survey: &report.survey,
        summary: summarize(report),
        areas: report.areas.values().collect(),
        areas_by_dominant: report
            .areas_by_dominant()
            .into_iter()
            .map(|(kind, indices)| (kind.to_string(), indices))
            .collect(),
        rows: report.rows(),
        diagnostics: report.diagnostics(),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => AnalysisConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(AnalysisConfig::load()),
    }
}

fn run_analyze(input: &Path, config: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read survey {}", input.display()))?;
    let survey = SurveyInput::from_json(&text)
        .with_context(|| format!("Failed to parse survey {}", input.display()))?;
    let prepared = survey.prepare(&config).context("Invalid survey records")?;

    let pipeline = FaultPipeline::new(config).context("Invalid analysis config")?;
    let report = pipeline
        .run(
            prepared.samples,
            &prepared.capacity,
            prepared.median_site_distance_m,
        )
        .context("Analysis failed")?;

    let summary = summarize(&report);
    println!("Survey:           {}", report.survey);
    println!("Samples:          {}", summary.samples);
    println!("Problem areas:    {}", summary.areas);
    println!("Problem-free:     {}", summary.problem_free_samples);
    for (label, count) in &summary.dominant {
        println!("  {label:<26} {count}");
    }
    println!("Soft failures:    {}", summary.soft_failures);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&to_document(&report))
            .context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!(path = %path.display(), "Report written");
    }
    Ok(())
}

fn run_check_config(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    config.validate().context("Config validation failed")?;
    print!("{}", config.to_toml()?);
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    match args.command {
        SubCommand::Analyze {
            input,
            config,
            output,
        } => run_analyze(&input, config.as_deref(), output.as_deref()),
        SubCommand::CheckConfig { config } => run_check_config(config.as_deref()),
        SubCommand::Defaults => {
            print!("{}", AnalysisConfig::default().to_toml()?);
            Ok(())
        }
    }
}
