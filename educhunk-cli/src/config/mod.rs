//! Configuration file support
//!
//! Every section and field is optional; missing values fall back to the
//! library defaults and command-line flags override the file.

use crate::error::{CliError, CliResult};
use anyhow::Context;
use educhunk_core::{scorer, Dimension, ExtentPolicy, ScoringConfig, DEFAULT_TABLE};
use educhunk_engine::{config::defaults, EnrichmentConfig, PipelineConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct CliConfig {
    /// Processing configuration
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Quality scoring configuration
    #[serde(default)]
    pub scoring: ScoringSection,

    /// Enrichment service configuration
    #[serde(default)]
    pub enrichment: EnrichmentSection,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Processing-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Embedded pattern table
    pub table: String,

    /// Keep only rules for this language ("en", "hi")
    pub language: Option<String>,

    /// Drop detections below this confidence
    pub min_confidence: f64,

    /// Split units longer than this many bytes
    pub max_unit_len: usize,

    /// Detect section headers when no marker sidecar is present
    pub detect_sections: bool,

    /// Grow activities, examples and boxes past their header line
    pub grow_extents: bool,

    /// Subject passed to enrichment
    pub subject: Option<String>,

    /// Grade passed to enrichment
    pub grade: Option<u8>,

    /// Batch size at which processing goes parallel
    pub parallel_threshold: usize,

    /// Number of worker threads (0 = auto)
    pub worker_threads: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            language: None,
            min_confidence: educhunk_core::detector::defaults::MIN_CONFIDENCE,
            max_unit_len: educhunk_core::resolver::defaults::MAX_UNIT_LEN,
            detect_sections: true,
            grow_extents: false,
            subject: None,
            grade: None,
            parallel_threshold: defaults::PARALLEL_THRESHOLD,
            worker_threads: 0,
        }
    }
}

/// Quality scoring thresholds
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ScoringSection {
    /// Completeness lost per truncated sentence, as a fraction
    pub truncation_penalty: f64,

    /// Coherence lost per repeated line
    pub repeated_line_penalty: f64,

    /// Coherence lost when the text starts mid-sentence
    pub broken_start_penalty: f64,

    /// Coherence lost when elements appear out of order
    pub order_penalty: f64,

    /// Fraction of good candidate terms that scores 1.0
    pub good_concept_fraction: f64,

    /// Application elements that score 1.0
    pub application_target: usize,

    /// Aggregate weights by dimension name; empty means a plain mean
    pub weights: BTreeMap<String, f64>,
}

impl Default for ScoringSection {
    fn default() -> Self {
        Self {
            truncation_penalty: scorer::defaults::TRUNCATION_PENALTY,
            repeated_line_penalty: scorer::defaults::REPEATED_LINE_PENALTY,
            broken_start_penalty: scorer::defaults::BROKEN_START_PENALTY,
            order_penalty: scorer::defaults::ORDER_PENALTY,
            good_concept_fraction: scorer::defaults::GOOD_CONCEPT_FRACTION,
            application_target: scorer::defaults::APPLICATION_TARGET,
            weights: BTreeMap::new(),
        }
    }
}

impl ScoringSection {
    /// Convert into the scorer's configuration
    pub fn to_scoring_config(&self) -> CliResult<ScoringConfig> {
        let mut weights = BTreeMap::new();
        for (name, weight) in &self.weights {
            let dimension: Dimension = name
                .parse()
                .map_err(|e| CliError::ConfigError(format!("[scoring.weights] {e}")))?;
            weights.insert(dimension, *weight);
        }

        Ok(ScoringConfig {
            truncation_penalty: self.truncation_penalty,
            repeated_line_penalty: self.repeated_line_penalty,
            broken_start_penalty: self.broken_start_penalty,
            order_penalty: self.order_penalty,
            good_concept_fraction: self.good_concept_fraction,
            application_target: self.application_target,
            weights,
            ..ScoringConfig::default()
        })
    }
}

/// Enrichment service settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EnrichmentSection {
    /// Endpoint URL; enrichment is off when unset
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Retries after a transient failure
    pub max_retries: u32,

    /// Environment variable holding a bearer token
    pub token_env: Option<String>,
}

impl Default for EnrichmentSection {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: defaults::ENRICHMENT_TIMEOUT_SECS,
            max_retries: defaults::ENRICHMENT_RETRIES,
            token_env: None,
        }
    }
}

impl EnrichmentSection {
    /// Convert into the engine's enrichment settings
    pub fn to_enrichment_config(&self) -> EnrichmentConfig {
        EnrichmentConfig {
            enabled: self.endpoint.is_some(),
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            token_env: self.token_env.clone(),
        }
    }
}

/// Output-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub default_format: String,

    /// Include per-dimension scores and metadata in text output
    pub include_metadata: bool,

    /// Pretty print JSON output
    pub pretty_json: bool,

    /// Directory for the JSON chunk store
    pub store: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: "text".to_string(),
            include_metadata: false,
            pretty_json: true,
            store: None,
        }
    }
}

impl CliConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> CliResult<Self> {
        let config: CliConfig =
            toml::from_str(content).map_err(|e| CliError::ConfigError(e.to_string()))?;
        Ok(config)
    }

    /// Build the pipeline configuration described by this file
    pub fn to_pipeline_config(&self) -> CliResult<PipelineConfig> {
        let processing = &self.processing;
        let mut builder = PipelineConfig::builder()
            .table(processing.table.clone())
            .min_confidence(processing.min_confidence)
            .max_unit_len(processing.max_unit_len)
            .detect_sections(processing.detect_sections)
            .extents(processing.grow_extents.then(ExtentPolicy::default))
            .scoring(self.scoring.to_scoring_config()?)
            .enrichment(self.enrichment.to_enrichment_config())
            .parallel_threshold(processing.parallel_threshold)
            .threads((processing.worker_threads > 0).then_some(processing.worker_threads));
        if let Some(language) = &processing.language {
            builder = builder.language(language.clone());
        }

        let config = builder
            .build()
            .map_err(|e| CliError::ConfigError(e.to_string()))?;
        Ok(config)
    }
}
