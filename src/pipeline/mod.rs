//! Fault Analysis Pipeline
//!
//! ## Stage Architecture
//!
//! ```text
//! STAGE 0: Validation + stable sort by timestamp
//! STAGE 1: Segmentation (sequential, stateful)
//! STAGE 2: Fault detection (parallel per sample)
//! STAGE 3: Area aggregation (parallel per area)
//!          ── barrier: corpus-wide severity bands ──
//! STAGE 4: Dominant resolution (parallel per area)
//! ```
//!
//! A run is atomic: `FaultPipeline::run` returns a complete report or an
//! error. Soft failures (capacity lookups, malformed profiles) are recorded
//! in the report's diagnostics and never abort the run.

mod report;

pub use report::{AnalysisReport, AnnotatedSample, ReportRow};

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::aggregation::{group_areas, AreaAggregator};
use crate::config::AnalysisConfig;
use crate::detection::{DetectionContext, FaultDetector};
use crate::error::{Diagnostics, PipelineError, SoftFailure};
use crate::resolution::{AreaEvidence, DominantResolver, SeverityBands};
use crate::segmentation::AreaSegmenter;
use crate::types::{AreaAnnotation, CapacityTable, CellIdentity, Sample};

/// Runs the four analysis stages over one survey.
#[derive(Debug, Clone)]
pub struct FaultPipeline {
    config: AnalysisConfig,
}

impl FaultPipeline {
    /// Build a pipeline; the config is validated up front.
    pub fn new(config: AnalysisConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a survey.
    ///
    /// `median_site_distance_m` is the corpus median inter-site distance used
    /// for the overshooting distance bands.
    pub fn run(
        &self,
        mut samples: Vec<Sample>,
        capacity: &CapacityTable,
        median_site_distance_m: f64,
    ) -> Result<AnalysisReport, PipelineError> {
        let cfg = &self.config;
        let parallel = cfg.pipeline.parallel;

        // Stage 0: fatal input checks, then stable sort (ties keep ingestion order)
        if !(median_site_distance_m.is_finite() && median_site_distance_m > 0.0) {
            return Err(PipelineError::InvalidSiteDistance(median_site_distance_m));
        }
        for (index, sample) in samples.iter().enumerate() {
            if let Some(field) = sample.first_non_finite() {
                return Err(PipelineError::NonFiniteKpi { index, field });
            }
        }
        samples.sort_by_key(|s| s.timestamp);

        // Stage 1: segmentation
        let segmenter =
            AreaSegmenter::new(cfg.segmentation.clone(), cfg.thresholds.throughput.target_kbps);
        let area_ids = segmenter.segment(&samples);
        let areas = group_areas(&area_ids);
        info!(
            survey = %cfg.survey.name,
            samples = samples.len(),
            areas = areas.len(),
            "Segmentation complete"
        );

        // Stage 2: detection
        let ctx = DetectionContext {
            thresholds: &cfg.thresholds,
            capacity,
        };
        let detections = FaultDetector::new(parallel).detect(&samples, &ctx);

        let mut diagnostics = Diagnostics::default();
        for (sample_index, (sample, detection)) in samples.iter().zip(&detections).enumerate() {
            if let Some(err) = &detection.soft_failure {
                warn!(sample = sample_index, error = %err, "Capacity lookup failed, High Load set to false");
                diagnostics.push(SoftFailure::Utilization {
                    sample_index,
                    cell: CellIdentity::serving(sample),
                    reason: err.to_string(),
                });
            }
        }
        let flags: Vec<_> = detections.iter().map(|d| d.flags).collect();
        info!(
            flagged = flags.iter().filter(|f| f.total() > 0).count(),
            soft_failures = diagnostics.len(),
            "Fault detection complete"
        );

        // Stage 3: aggregation
        let summaries =
            AreaAggregator::new(cfg.aggregation.clone(), parallel).aggregate(&areas, &flags);

        // Barrier: corpus-wide bands before any area is resolved
        let bands = SeverityBands::compute(&samples, &areas, cfg, median_site_distance_m);
        debug!(
            rsrp_cuts = ?bands.rsrp.as_ref().map(|b| b.cuts().to_vec()),
            sinr_cuts = ?bands.sinr.as_ref().map(|b| b.cuts().to_vec()),
            "Severity bands computed"
        );

        // Stage 4: resolution
        let inputs: Vec<(String, AreaEvidence)> = summaries
            .iter()
            .zip(&areas)
            .map(|(summary, members)| {
                let evidence = AreaEvidence::gather(
                    &bands,
                    &samples,
                    &flags,
                    members,
                    cfg.resolution.handover_run_length,
                );
                (summary.profile.to_string(), evidence)
            })
            .collect();
        let resolved = DominantResolver::new(cfg.resolution.clone(), parallel).resolve_all(&inputs);

        let mut side_table = BTreeMap::new();
        for ((summary, (profile, _)), outcome) in summaries.into_iter().zip(inputs).zip(resolved) {
            let area_id = summary.stats.area_id;
            let dominant = match outcome {
                Ok(label) => {
                    debug!(area = area_id, profile = %profile, dominant = %label, "Area resolved");
                    Some(label)
                }
                Err(err) => {
                    warn!(area = area_id, profile = %profile, error = %err, "Malformed area profile, dominant label left blank");
                    diagnostics.push(SoftFailure::Profile {
                        area_id,
                        profile: profile.clone(),
                        reason: err.to_string(),
                    });
                    None
                }
            };
            side_table.insert(
                area_id,
                AreaAnnotation {
                    stats: summary.stats,
                    profile,
                    dominant,
                },
            );
        }

        let annotated = samples
            .into_iter()
            .zip(area_ids)
            .zip(detections)
            .map(|((sample, area_id), detection)| AnnotatedSample {
                sample,
                area_id,
                total_issues: detection.flags.total(),
                flags: detection.flags,
                overlap: detection.overlap,
            })
            .collect();

        let report = AnalysisReport {
            survey: cfg.survey.name.clone(),
            target_kbps: cfg.thresholds.throughput.target_kbps,
            samples: annotated,
            areas: side_table,
            diagnostics,
        };
        info!(
            areas = report.area_count(),
            dominant = ?report.dominant_counts(),
            soft_failures = report.diagnostics.len(),
            "Analysis complete"
        );
        Ok(report)
    }
}
