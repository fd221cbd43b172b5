use super::{Enricher, EnrichmentContext, EnrichmentError};
use educhunk_core::EnrichmentResult;

/// Enricher that never contacts anything
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineEnricher;

impl Enricher for OfflineEnricher {
    fn enrich(
        &self,
        _text: &str,
        _context: &EnrichmentContext,
    ) -> Result<Option<EnrichmentResult>, EnrichmentError> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
