//! Configuration for seoscan

mod analysis;
mod batch;
mod logging;
mod quality;

pub use analysis::AnalysisConfig;
pub use batch::BatchConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use quality::{QualityConfig, ScorerBackendConfig};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for a batch analysis run.
///
/// Thresholds and weights are passed explicitly into the batch entry point
/// rather than read from ambient global state, so runs are deterministic and
/// test-isolated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analysis thresholds and fusion weights
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Worker pool and timeouts
    #[serde(default)]
    pub batch: BatchConfig,
    /// Quality scorer backend
    #[serde(default)]
    pub quality: QualityConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it before returning.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass. Invalid configuration is fatal: a
    /// batch never runs with out-of-range thresholds or weights.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if !(0.0..=1.0).contains(&self.analysis.similarity_threshold) {
            errors.push("similarity_threshold must be between 0.0 and 1.0".to_string());
        }
        if !(0.0..=100.0).contains(&self.analysis.duplicate_threshold) {
            errors.push("duplicate_threshold must be between 0.0 and 100.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.analysis.duplicate_weight) {
            errors.push("duplicate_weight must be between 0.0 and 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.analysis.quality_weight) {
            errors.push("quality_weight must be between 0.0 and 1.0".to_string());
        }
        let weight_sum = self.analysis.duplicate_weight + self.analysis.quality_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            errors.push(format!(
                "duplicate_weight and quality_weight must sum to 1.0, got {}",
                weight_sum
            ));
        }

        if self.batch.max_workers == 0 {
            errors.push("max_workers must be positive".to_string());
        }
        if self.batch.request_timeout_secs == 0 {
            errors.push("request_timeout_secs must be positive".to_string());
        }
        if self.batch.deadline_secs == Some(0) {
            errors.push("deadline_secs must be positive when set".to_string());
        }

        if self.quality.timeout_secs == 0 {
            errors.push("quality timeout_secs must be positive".to_string());
        }
        if self.quality.model.is_empty() {
            errors.push("quality model must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config::default()
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_similarity_threshold_out_of_range() {
        let mut cfg = valid_config();
        cfg.analysis.similarity_threshold = 1.5;
        let err = cfg.validate().unwrap_err();
        assert!(err
            .to_string()
            .contains("similarity_threshold must be between 0.0 and 1.0"));
    }

    #[test]
    fn validate_rejects_negative_similarity_threshold() {
        let mut cfg = valid_config();
        cfg.analysis.similarity_threshold = -0.1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_weights_not_summing_to_one() {
        let mut cfg = valid_config();
        cfg.analysis.duplicate_weight = 0.6;
        cfg.analysis.quality_weight = 0.3;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("must sum to 1.0"));
    }

    #[test]
    fn validate_accepts_alternate_weights_summing_to_one() {
        let mut cfg = valid_config();
        cfg.analysis.duplicate_weight = 0.5;
        cfg.analysis.quality_weight = 0.5;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let mut cfg = valid_config();
        cfg.batch.max_workers = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_workers must be positive"));
    }

    #[test]
    fn validate_rejects_zero_deadline() {
        let mut cfg = valid_config();
        cfg.batch.deadline_secs = Some(0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_collects_multiple_errors() {
        let mut cfg = valid_config();
        cfg.analysis.similarity_threshold = 2.0;
        cfg.batch.max_workers = 0;
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("similarity_threshold"));
        assert!(msg.contains("max_workers"));
    }

    #[test]
    fn default_analysis_config_values() {
        let a = AnalysisConfig::default();
        assert!((a.similarity_threshold - 0.85).abs() < f32::EPSILON);
        assert!((a.duplicate_threshold - 15.0).abs() < f32::EPSILON);
        assert!((a.duplicate_weight - 0.7).abs() < f32::EPSILON);
        assert!((a.quality_weight - 0.3).abs() < f32::EPSILON);
        assert!(!a.count_intra_url);
    }

    #[test]
    fn default_batch_config_values() {
        let b = BatchConfig::default();
        assert_eq!(b.max_workers, 4);
        assert_eq!(b.request_timeout_secs, 15);
        assert!(b.deadline_secs.is_none());
    }

    #[test]
    fn load_parses_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seoscan.toml");
        std::fs::write(
            &path,
            r#"
[analysis]
similarity_threshold = 0.9
duplicate_threshold = 20.0
duplicate_weight = 0.7
quality_weight = 0.3
count_intra_url = false

[batch]
max_workers = 8
request_timeout_secs = 30
"#,
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert!((cfg.analysis.similarity_threshold - 0.9).abs() < f32::EPSILON);
        assert_eq!(cfg.batch.max_workers, 8);
        // Unspecified sections fall back to defaults
        assert_eq!(cfg.quality.timeout_secs, 15);
    }

    #[test]
    fn load_rejects_invalid_toml_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seoscan.toml");
        std::fs::write(
            &path,
            r#"
[analysis]
similarity_threshold = 3.0
duplicate_threshold = 15.0
duplicate_weight = 0.7
quality_weight = 0.3
count_intra_url = false
"#,
        )
        .unwrap();

        assert!(Config::load(&path).is_err());
    }
}
