//! Per-document pipeline
//!
//! detect -> resolve -> assemble -> score -> enrich, synchronously, with a
//! cancellation check between stages.

use crate::config::PipelineConfig;
use crate::enrich::{self, Enricher, EnrichmentContext};
use crate::error::{EngineError, Result};
use educhunk_core::{
    get_pattern_table, BoundaryResolver, Chunk, ChunkAssembler, ElementDetector,
    MetadataExtractor, MetadataScorer, PatternLibrary, SectionDetector, SectionMarker,
    SourceDocument,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Shared flag that stops processing between stages
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`EngineError::Cancelled`] once cancellation was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Counters for one processed document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingStats {
    /// Elements kept by the detector
    pub elements: usize,
    /// Section markers used
    pub markers: usize,
    /// Chunks produced
    pub chunks: usize,
    /// Chunks that received enrichment
    pub enriched: usize,
    /// Wall time in milliseconds
    pub processing_time_ms: f64,
}

/// Chunks of one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentOutput {
    /// Source document id
    pub document_id: String,
    /// Chunks in document order
    pub chunks: Vec<Chunk>,
    /// Processing counters
    pub stats: ProcessingStats,
}

/// Runs the full chunking pipeline for single documents
pub struct ChunkPipeline {
    detector: ElementDetector,
    sections: SectionDetector,
    resolver: BoundaryResolver,
    assembler: ChunkAssembler,
    scorer: MetadataScorer,
    extractor: MetadataExtractor,
    enricher: Arc<dyn Enricher>,
    config: PipelineConfig,
}

impl ChunkPipeline {
    /// Create a pipeline with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline from a configuration
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let table = get_pattern_table(&config.table)?;
        let library: Arc<PatternLibrary> = match &config.language {
            Some(code) => Arc::new(table.for_language(code)),
            None => table,
        };

        let enricher = enrich::from_config(&config.enrichment)
            .map_err(|e| EngineError::Config(e.to_string()))?;

        Ok(Self {
            detector: ElementDetector::with_config(library, config.detector.clone())?,
            sections: SectionDetector::new(),
            resolver: BoundaryResolver::with_config(config.resolver.clone())?,
            assembler: ChunkAssembler::new(),
            scorer: MetadataScorer::with_config(config.scoring.clone())?,
            extractor: MetadataExtractor::with_config(config.metadata.clone())?,
            enricher,
            config,
        })
    }

    /// Replace the enricher
    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enricher = enricher;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Pattern library used for detection
    pub fn library(&self) -> &PatternLibrary {
        self.detector.library()
    }

    /// Process one document
    ///
    /// Without markers the sections are detected from the text, unless
    /// section detection is disabled. Enrichment failures never fail the
    /// document.
    pub fn process(
        &self,
        document: &SourceDocument,
        markers: Option<&[SectionMarker]>,
        token: &CancellationToken,
    ) -> Result<DocumentOutput> {
        let started = Instant::now();
        let text = document.text.as_str();

        token.check()?;
        let detected;
        let markers: &[SectionMarker] = match markers {
            Some(markers) => markers,
            None if self.config.detect_sections => {
                detected = self.sections.detect(text);
                &detected
            }
            None => &[],
        };

        let unit_starts: Vec<usize> = markers.iter().map(|m| m.offset).collect();
        let elements = self.detector.detect_with_stops(text, &unit_starts);

        token.check()?;
        let units = self.resolver.resolve(text, &elements, markers)?;

        token.check()?;
        let mut scored = Vec::with_capacity(units.len());
        for unit in &units {
            let chunk = self.assembler.assemble(document, unit)?;
            let metadata = self.extractor.extract(&chunk);
            scored.push(self.scorer.apply(chunk).with_metadata(metadata));
        }

        let context = EnrichmentContext {
            subject: document.subject.clone(),
            grade: document.grade,
        };
        let mut enriched = 0;
        let mut chunks = Vec::with_capacity(scored.len());
        for chunk in scored {
            token.check()?;
            let enrichment = self.enrich(&chunk.id, &chunk.text, &context);
            if enrichment.is_some() {
                enriched += 1;
            }
            chunks.push(chunk.with_enrichment(enrichment));
        }

        let stats = ProcessingStats {
            elements: elements.len(),
            markers: markers.len(),
            chunks: chunks.len(),
            enriched,
            processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        };
        log::info!(
            "{}: {} chunks from {} elements and {} markers in {:.1} ms",
            document.id,
            stats.chunks,
            stats.elements,
            stats.markers,
            stats.processing_time_ms
        );

        Ok(DocumentOutput {
            document_id: document.id.clone(),
            chunks,
            stats,
        })
    }

    fn enrich(
        &self,
        chunk_id: &str,
        text: &str,
        context: &EnrichmentContext,
    ) -> Option<educhunk_core::EnrichmentResult> {
        match self.enricher.enrich(text, context) {
            Ok(result) => result,
            Err(e) => {
                log::warn!(
                    "{} enrichment failed for chunk {}: {}",
                    self.enricher.name(),
                    chunk_id,
                    e
                );
                None
            }
        }
    }
}
