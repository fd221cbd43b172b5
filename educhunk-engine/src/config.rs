//! Pipeline configuration

use crate::error::{EngineError, Result};
use crate::executor::ExecutionMode;
use educhunk_core::{
    DetectorConfig, ExtentPolicy, MetadataConfig, ResolverConfig, ScoringConfig, DEFAULT_TABLE,
};
use std::time::Duration;

/// Default pipeline settings
pub mod defaults {
    /// Enrichment request timeout in seconds
    pub const ENRICHMENT_TIMEOUT_SECS: u64 = 30;

    /// Retries after a transient enrichment failure
    pub const ENRICHMENT_RETRIES: u32 = 1;

    /// Batch size at which parallel execution pays off
    pub const PARALLEL_THRESHOLD: usize = 4;
}

/// Enrichment service settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentConfig {
    /// Call the service at all
    pub enabled: bool,
    /// Endpoint receiving `{text, subject, grade}`
    pub endpoint: Option<String>,
    /// Bound on each request, connection to last body byte
    pub timeout: Duration,
    /// Retries after a transient failure
    pub max_retries: u32,
    /// Environment variable holding a bearer token
    pub token_env: Option<String>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            timeout: Duration::from_secs(defaults::ENRICHMENT_TIMEOUT_SECS),
            max_retries: defaults::ENRICHMENT_RETRIES,
            token_env: None,
        }
    }
}

impl EnrichmentConfig {
    /// Enrichment disabled
    pub fn offline() -> Self {
        Self::default()
    }

    /// Enrichment through an HTTP endpoint
    pub fn http(endpoint: impl Into<String>) -> Self {
        Self {
            enabled: true,
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        match self.endpoint.as_deref() {
            None | Some("") => {
                return Err(EngineError::Config(
                    "enrichment is enabled but no endpoint is set".into(),
                ))
            }
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                return Err(EngineError::Config(format!(
                    "enrichment endpoint must be an http(s) URL: {url}"
                )))
            }
            Some(_) => {}
        }
        if self.timeout.is_zero() {
            return Err(EngineError::Config(
                "enrichment timeout must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for the whole document pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Embedded pattern table name
    pub table: String,
    /// Keep only rules tagged with this language (or "any")
    pub language: Option<String>,
    /// Element detection settings
    pub detector: DetectorConfig,
    /// Unit resolution settings
    pub resolver: ResolverConfig,
    /// Quality scoring thresholds
    pub scoring: ScoringConfig,
    /// Metadata extraction settings
    pub metadata: MetadataConfig,
    /// Detect section markers when a document comes without any
    pub detect_sections: bool,
    /// Enrichment service settings
    pub enrichment: EnrichmentConfig,
    /// Fixed execution mode for batches (None = auto)
    pub execution_mode: Option<ExecutionMode>,
    /// Batch size at which auto mode goes parallel
    pub parallel_threshold: usize,
    /// Worker threads for parallel batches (None = rayon default)
    pub threads: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            language: None,
            detector: DetectorConfig::default(),
            resolver: ResolverConfig::default(),
            scoring: ScoringConfig::default(),
            metadata: MetadataConfig::default(),
            detect_sections: true,
            enrichment: EnrichmentConfig::default(),
            execution_mode: None,
            parallel_threshold: defaults::PARALLEL_THRESHOLD,
            threads: None,
        }
    }
}

impl PipelineConfig {
    /// Create a builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(EngineError::Config("pattern table name is empty".into()));
        }
        self.detector.validate()?;
        self.resolver.validate()?;
        self.scoring.validate()?;
        self.enrichment.validate()?;
        if self.metadata.reading_wpm == 0 {
            return Err(EngineError::Config(
                "reading speed must be greater than 0".into(),
            ));
        }
        if self.threads == Some(0) {
            return Err(EngineError::Config(
                "thread count must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Fluent builder for [`PipelineConfig`]
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Start from the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another embedded pattern table
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.config.table = name.into();
        self
    }

    /// Restrict rules to one language
    pub fn language(mut self, code: impl Into<String>) -> Self {
        self.config.language = Some(code.into());
        self
    }

    /// Drop detections below this confidence
    pub fn min_confidence(mut self, value: f64) -> Self {
        self.config.detector.min_confidence = value;
        self
    }

    /// Grow block elements up to the given maxima
    pub fn extents(mut self, policy: Option<ExtentPolicy>) -> Self {
        self.config.detector.extents = policy;
        self
    }

    /// Split units longer than this many bytes
    pub fn max_unit_len(mut self, bytes: usize) -> Self {
        self.config.resolver.max_unit_len = bytes;
        self
    }

    /// Replace the scoring thresholds
    pub fn scoring(mut self, scoring: ScoringConfig) -> Self {
        self.config.scoring = scoring;
        self
    }

    /// Replace the metadata settings
    pub fn metadata(mut self, metadata: MetadataConfig) -> Self {
        self.config.metadata = metadata;
        self
    }

    /// Toggle section detection for documents without markers
    pub fn detect_sections(mut self, enabled: bool) -> Self {
        self.config.detect_sections = enabled;
        self
    }

    /// Replace the enrichment settings
    pub fn enrichment(mut self, enrichment: EnrichmentConfig) -> Self {
        self.config.enrichment = enrichment;
        self
    }

    /// Force an execution mode for batches
    pub fn execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.config.execution_mode = Some(mode);
        self
    }

    /// Batch size at which auto mode goes parallel
    pub fn parallel_threshold(mut self, documents: usize) -> Self {
        self.config.parallel_threshold = documents;
        self
    }

    /// Worker threads for parallel batches
    pub fn threads(mut self, count: Option<usize>) -> Self {
        self.config.threads = count;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
