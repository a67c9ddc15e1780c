//! Config validation: unknown-key detection with Levenshtein suggestions
//! and radio range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for AnalysisConfig.
///
/// Any new field added to AnalysisConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [survey]
        "survey",
        "survey.name",
        "survey.region",
        // [thresholds]
        "thresholds",
        "thresholds.throughput",
        "thresholds.throughput.target_kbps",
        "thresholds.coverage",
        "thresholds.coverage.target_rsrp_dbm",
        "thresholds.coverage.min_serving_rsrp_dbm",
        "thresholds.handover",
        "thresholds.handover.neighbor_margin_db",
        "thresholds.overlap",
        "thresholds.overlap.window_db",
        "thresholds.overlap.min_sinr_db",
        "thresholds.load",
        "thresholds.load.max_resource_blocks",
        "thresholds.load.utilization_threshold_percent",
        "thresholds.distance",
        "thresholds.distance.max_distance_m",
        "thresholds.distance.max_ue_tx_power_dbm",
        // [segmentation]
        "segmentation",
        "segmentation.min_area_samples",
        "segmentation.max_area_samples",
        "segmentation.max_gap_seconds",
        "segmentation.gap_policy",
        // [aggregation]
        "aggregation",
        "aggregation.min_share_percent",
        "aggregation.top_n",
        // [resolution]
        "resolution",
        "resolution.decisive_gap_percent",
        "resolution.handover_run_length",
        "resolution.tie_epsilon",
        "resolution.quantile_levels",
        "resolution.resource_block_edges",
        "resolution.distance_multiples",
        // [pipeline]
        "pipeline",
        "pipeline.parallel",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Dotted paths of every key in a parsed TOML document, tables included.
///
/// `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
fn walk_toml_keys(value: &toml::Value) -> Vec<String> {
    fn collect(table: &toml::Table, prefix: Option<&str>, out: &mut Vec<String>) {
        for (k, v) in table {
            let path = prefix.map_or_else(|| k.clone(), |p| format!("{p}.{k}"));
            if let Some(inner) = v.as_table() {
                out.push(path.clone());
                collect(inner, Some(&path), out);
            } else {
                out.push(path);
            }
        }
    }

    let mut out = Vec::new();
    if let Some(table) = value.as_table() {
        collect(table, None, &mut out);
    }
    out
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Edit distance over chars, single-row table.
fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitute = diagonal + usize::from(ca != *cb);
            diagonal = row[j + 1];
            row[j + 1] = substitute.min(row[j] + 1).min(diagonal + 1);
        }
    }
    row[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Equal distances resolve to the lexicographically smallest key so the
/// suggestion does not depend on hash order.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (levenshtein(unknown, k), *k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are reported by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value)
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Radio Range Validation
// ============================================================================

/// Validate radio ranges on a parsed AnalysisConfig.
///
/// Returns (errors, warnings): errors are impossible values that must
/// prevent a run; warnings are suspicious but not fatal.
pub fn validate_physical_ranges(
    config: &super::AnalysisConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let t = &config.thresholds;

    // LTE RSRP reporting range is -140..-44 dBm
    for (field, value) in [
        ("thresholds.coverage.target_rsrp_dbm", t.coverage.target_rsrp_dbm),
        ("thresholds.coverage.min_serving_rsrp_dbm", t.coverage.min_serving_rsrp_dbm),
    ] {
        if !(-140.0..=-44.0).contains(&value) {
            errors.push(format!(
                "{field} = {value:.1} is outside the RSRP range (-140 to -44 dBm)"
            ));
        }
    }

    let util = t.load.utilization_threshold_percent;
    if !(0.0..=100.0).contains(&util) {
        errors.push(format!(
            "thresholds.load.utilization_threshold_percent = {util:.1} must be within 0-100"
        ));
    }

    if t.throughput.target_kbps <= 0.0 {
        errors.push(format!(
            "thresholds.throughput.target_kbps = {:.1} must be > 0",
            t.throughput.target_kbps
        ));
    }

    let sinr = t.overlap.min_sinr_db;
    if !(-20.0..=40.0).contains(&sinr) {
        warnings.push(ValidationWarning {
            field: "thresholds.overlap.min_sinr_db".to_string(),
            message: format!("min_sinr_db = {sinr:.1} is outside typical range (-20 to 40 dB)"),
            suggestion: None,
        });
    }

    let rb = t.load.max_resource_blocks;
    if rb <= 0.0 || rb > 100.0 {
        warnings.push(ValidationWarning {
            field: "thresholds.load.max_resource_blocks".to_string(),
            message: format!("max_resource_blocks = {rb:.1} is outside typical range (1-100 RB)"),
            suggestion: None,
        });
    }

    let power = t.distance.max_ue_tx_power_dbm;
    if !(-40.0..=33.0).contains(&power) {
        warnings.push(ValidationWarning {
            field: "thresholds.distance.max_ue_tx_power_dbm".to_string(),
            message: format!(
                "max_ue_tx_power_dbm = {power:.1} is outside UE power range (-40 to 33 dBm)"
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("window_db", "window_db"), 0);
    }

    #[test]
    fn test_levenshtein_counts_edits() {
        assert_eq!(levenshtein("min_sinr_bd", "min_sinr_db"), 2);
        assert_eq!(levenshtein("targt_kbps", "target_kbps"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [thresholds]
            [thresholds.overlap]
            window_db = 5.0
        "#
        .parse()
        .expect("valid toml");
        let keys = walk_toml_keys(&toml);
        assert!(keys.contains(&"thresholds".to_string()));
        assert!(keys.contains(&"thresholds.overlap".to_string()));
        assert!(keys.contains(&"thresholds.overlap.window_db".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[thresholds.coverage]
target_rsrp_dmb = -100.0
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].field.contains("target_rsrp_dmb"));
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("thresholds.coverage.target_rsrp_dbm")
        );
        assert_eq!(
            warnings[0].to_string(),
            "Unknown config key 'thresholds.coverage.target_rsrp_dmb' \
             (did you mean 'thresholds.coverage.target_rsrp_dbm'?)"
        );
    }

    #[test]
    fn test_walk_skips_array_contents() {
        let toml: toml::Value = "[resolution]\nquantile_levels = [0.5, 1.0]\n"
            .parse()
            .expect("valid toml");
        assert_eq!(
            walk_toml_keys(&toml),
            vec!["resolution".to_string(), "resolution.quantile_levels".to_string()]
        );
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[survey]
name = "Week-12"
region = "North"

[thresholds.load]
utilization_threshold_percent = 75.0

[resolution]
quantile_levels = [0.25, 0.5, 0.75, 1.0]

[pipeline]
parallel = false
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {:?}", warnings);
    }

    #[test]
    fn test_unknown_section_produces_warning() {
        let warnings = validate_unknown_keys("[thresholds.interference]\nlimit = 3\n");
        assert!(warnings.iter().any(|w| w.field.contains("interference")));
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_rsrp_target_out_of_range() {
        let mut config = crate::config::AnalysisConfig::default();
        config.thresholds.coverage.target_rsrp_dbm = -20.0;
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("target_rsrp_dbm")));
    }

    #[test]
    fn test_defaults_are_clean() {
        let (errors, warnings) =
            validate_physical_ranges(&crate::config::AnalysisConfig::default());
        assert!(errors.is_empty(), "{errors:?}");
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn test_odd_sinr_only_warns() {
        let mut config = crate::config::AnalysisConfig::default();
        config.thresholds.overlap.min_sinr_db = 55.0;
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty());
        assert_eq!(warnings.len(), 1);
    }
}
