//! Document orchestration for educhunk
//!
//! This crate runs the core chunking pipeline over whole documents and
//! batches: optional enrichment through an external service, cancellation
//! between stages, sequential or parallel batch execution, and an
//! all-or-nothing JSON chunk store.

#![warn(missing_docs)]

pub mod config;
pub mod enrich;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod store;

// Re-export key types
pub use config::{EnrichmentConfig, PipelineConfig, PipelineConfigBuilder};
pub use enrich::{Enricher, EnrichmentContext, EnrichmentError, HttpEnricher, OfflineEnricher};
pub use error::{EngineError, Result};
pub use executor::{auto_select, run_batch, DocumentJob, DocumentOutcome, ExecutionMode, Executor};
pub use pipeline::{CancellationToken, ChunkPipeline, DocumentOutput, ProcessingStats};
pub use store::JsonRecordStore;

// Re-export from core for convenience
pub use educhunk_core::{Chunk, SectionMarker, SourceDocument};
