//! Optional enrichment through an external text-generation service
//!
//! Enrichment is best-effort: a failure is reported as an
//! [`EnrichmentError`] and the pipeline keeps the chunk without it.

mod http;
mod offline;

pub use http::HttpEnricher;
pub use offline::OfflineEnricher;

use crate::config::EnrichmentConfig;
use educhunk_core::EnrichmentResult;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Enrichment failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    /// No response within the configured bound
    #[error("enrichment request timed out")]
    Timeout,

    /// The response could not be read as an enrichment object
    #[error("malformed enrichment response: {0}")]
    Malformed(String),

    /// Connection or protocol failure
    #[error("enrichment transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("enrichment service rejected the request with status {status}")]
    Rejected {
        /// HTTP status code
        status: u16,
    },

    /// The client could not be set up
    #[error("enrichment configuration error: {0}")]
    Configuration(String),
}

impl EnrichmentError {
    /// Whether a retry may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            EnrichmentError::Timeout | EnrichmentError::Transport(_) => true,
            EnrichmentError::Rejected { status } => *status == 429 || *status >= 500,
            EnrichmentError::Malformed(_) | EnrichmentError::Configuration(_) => false,
        }
    }
}

/// Document context sent along with the chunk text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentContext {
    /// Subject, e.g. "science"
    pub subject: Option<String>,
    /// Grade level
    pub grade: Option<u8>,
}

/// Source of non-authoritative chunk metadata
pub trait Enricher: Send + Sync {
    /// Suggest metadata for `text`
    ///
    /// `Ok(None)` means the enricher has nothing to offer.
    fn enrich(
        &self,
        text: &str,
        context: &EnrichmentContext,
    ) -> Result<Option<EnrichmentResult>, EnrichmentError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Build the enricher selected by the configuration
pub fn from_config(config: &EnrichmentConfig) -> Result<Arc<dyn Enricher>, EnrichmentError> {
    if config.enabled {
        Ok(Arc::new(HttpEnricher::new(config)?))
    } else {
        Ok(Arc::new(OfflineEnricher))
    }
}
