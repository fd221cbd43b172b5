//! Batch execution strategies
//!
//! Documents are independent, so a batch can run one document after
//! another or spread over a rayon pool. Either way each document yields its
//! own outcome; one failure never aborts the rest.

use crate::error::Result;
use crate::pipeline::{CancellationToken, ChunkPipeline, DocumentOutput};
use educhunk_core::{SectionMarker, SourceDocument};

#[cfg(feature = "parallel")]
pub mod parallel;
pub mod sequential;

#[cfg(feature = "parallel")]
pub use parallel::ParallelExecutor;
pub use sequential::SequentialExecutor;

/// Execution mode selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One document at a time
    Sequential,
    /// Documents spread over worker threads
    Parallel,
}

/// One document of a batch
#[derive(Debug, Clone)]
pub struct DocumentJob {
    /// Document to chunk
    pub document: SourceDocument,
    /// Section markers supplied with the text, if any
    pub markers: Option<Vec<SectionMarker>>,
}

impl DocumentJob {
    /// Job whose sections are detected from the text
    pub fn new(document: SourceDocument) -> Self {
        Self {
            document,
            markers: None,
        }
    }

    /// Supply section markers
    pub fn with_markers(mut self, markers: Vec<SectionMarker>) -> Self {
        self.markers = Some(markers);
        self
    }

    pub(crate) fn run(
        &self,
        pipeline: &ChunkPipeline,
        token: &CancellationToken,
    ) -> DocumentOutcome {
        let result = pipeline.process(&self.document, self.markers.as_deref(), token);
        if let Err(e) = &result {
            log::warn!("{}: {}", self.document.id, e);
        }
        DocumentOutcome {
            document_id: self.document.id.clone(),
            result,
        }
    }
}

/// Result of one document of a batch
#[derive(Debug)]
pub struct DocumentOutcome {
    /// Source document id
    pub document_id: String,
    /// Chunks, or the reason the document failed
    pub result: Result<DocumentOutput>,
}

impl DocumentOutcome {
    /// Whether the document was processed
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Strategy for running a batch
pub trait Executor: Send + Sync {
    /// Process every job, returning outcomes in job order
    fn run(
        &self,
        pipeline: &ChunkPipeline,
        jobs: &[DocumentJob],
        token: &CancellationToken,
    ) -> Vec<DocumentOutcome>;

    /// Get the execution mode
    fn mode(&self) -> ExecutionMode;
}

/// Pick a mode from the batch size
pub fn auto_select(document_count: usize, threshold: usize) -> ExecutionMode {
    if document_count < 2 || document_count < threshold {
        ExecutionMode::Sequential
    } else {
        #[cfg(feature = "parallel")]
        return ExecutionMode::Parallel;

        #[cfg(not(feature = "parallel"))]
        ExecutionMode::Sequential
    }
}

/// Build the executor for a mode
///
/// Without the `parallel` feature every mode runs sequentially.
pub fn executor_for(mode: ExecutionMode, threads: Option<usize>) -> Result<Box<dyn Executor>> {
    match mode {
        ExecutionMode::Sequential => Ok(Box::new(SequentialExecutor)),
        #[cfg(feature = "parallel")]
        ExecutionMode::Parallel => Ok(Box::new(ParallelExecutor::new(threads)?)),
        #[cfg(not(feature = "parallel"))]
        ExecutionMode::Parallel => {
            let _ = threads;
            log::warn!("parallel execution is not compiled in, running sequentially");
            Ok(Box::new(SequentialExecutor))
        }
    }
}

/// Run a batch with the mode the pipeline configuration asks for
pub fn run_batch(
    pipeline: &ChunkPipeline,
    jobs: &[DocumentJob],
    token: &CancellationToken,
) -> Result<Vec<DocumentOutcome>> {
    let config = pipeline.config();
    let mode = config
        .execution_mode
        .unwrap_or_else(|| auto_select(jobs.len(), config.parallel_threshold));
    let executor = executor_for(mode, config.threads)?;
    log::debug!("running {} documents in {:?} mode", jobs.len(), executor.mode());
    Ok(executor.run(pipeline, jobs, token))
}
