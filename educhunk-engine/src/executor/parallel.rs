//! Parallel execution strategy

use crate::{
    error::{EngineError, Result},
    executor::{DocumentJob, DocumentOutcome, ExecutionMode, Executor},
    pipeline::{CancellationToken, ChunkPipeline},
};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Parallel multi-threaded executor
#[derive(Debug)]
pub struct ParallelExecutor {
    pool: Option<ThreadPool>,
}

impl ParallelExecutor {
    /// Create an executor; `None` uses the global rayon pool
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let pool = match threads {
            Some(count) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(count)
                    .build()
                    .map_err(|e| EngineError::Config(format!("failed to build thread pool: {e}")))?,
            ),
            None => None,
        };
        Ok(Self { pool })
    }
}

impl Executor for ParallelExecutor {
    fn run(
        &self,
        pipeline: &ChunkPipeline,
        jobs: &[DocumentJob],
        token: &CancellationToken,
    ) -> Vec<DocumentOutcome> {
        let work = || {
            jobs.par_iter()
                .map(|job| job.run(pipeline, token))
                .collect::<Vec<_>>()
        };
        match &self.pool {
            Some(pool) => pool.install(work),
            None => work(),
        }
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Parallel
    }
}
