//! Sequential execution strategy

use crate::{
    executor::{DocumentJob, DocumentOutcome, ExecutionMode, Executor},
    pipeline::{CancellationToken, ChunkPipeline},
};

/// Sequential single-threaded executor
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn run(
        &self,
        pipeline: &ChunkPipeline,
        jobs: &[DocumentJob],
        token: &CancellationToken,
    ) -> Vec<DocumentOutcome> {
        jobs.iter().map(|job| job.run(pipeline, token)).collect()
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Sequential
    }
}
