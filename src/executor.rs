//! Schedulability test executor (C11, executor half).
//!
//! Grounded on
//! `original_source/simRT/utils/schedulability_test_executor.py`'s
//! `ExecutionStrategy`/`SerialStrategy`/`ParallelStrategy` (there a
//! `multiprocessing.Pool` raised to high priority via `psutil`) and
//! `PersistenceStrategy`/`SqlitePersistence`. The parallel strategy here
//! is a dedicated `rayon` thread pool sized to a caller-supplied worker
//! count rather than a process pool, since a taskset analysis is pure
//! CPU-bound work with no need for process isolation. Only the
//! persistence *interface* lives in this crate; a concrete sink
//! (SQLite, a file, whatever) is a caller's concern.

use crate::analyzer::{AnalysisResult, SchedulabilityAnalyzer};
use crate::error::EngineError;
use crate::platform::PlatformInfo;
use crate::task_model::TaskInfo;
use rayon::prelude::*;

pub mod prelude {
    pub use super::{ExecutionStrategy, PersistenceSink, SchedulabilityTestExecutor, Workload};
}

/// One taskset/platform pair to analyze, tagged with an id a
/// [`PersistenceSink`] can key its record on.
pub struct Workload {
    pub id: u64,
    pub taskset: Vec<TaskInfo>,
    pub platform: PlatformInfo,
}

pub trait PersistenceSink: Send + Sync {
    fn save(&self, workload_id: u64, result: &Result<AnalysisResult, EngineError>);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Serial,
    /// Runs workloads across a dedicated pool of `worker_count` threads
    /// rather than the process-global rayon pool, so a caller can bound
    /// how many cores a batch run claims.
    Parallel { worker_count: usize },
}

pub struct SchedulabilityTestExecutor<'a> {
    analyzer: &'a SchedulabilityAnalyzer,
    strategy: ExecutionStrategy,
}

impl<'a> SchedulabilityTestExecutor<'a> {
    pub fn new(analyzer: &'a SchedulabilityAnalyzer, strategy: ExecutionStrategy) -> Self {
        Self { analyzer, strategy }
    }

    pub fn execute(&self, workloads: &[Workload], sink: &dyn PersistenceSink) -> Vec<Result<AnalysisResult, EngineError>> {
        tracing::info!(count = workloads.len(), strategy = ?self.strategy, "running schedulability tests");

        match self.strategy {
            ExecutionStrategy::Serial => workloads.iter()
                .map(|workload| self.analyze_and_save(workload, sink))
                .collect(),
            ExecutionStrategy::Parallel { worker_count } => {
                match rayon::ThreadPoolBuilder::new().num_threads(worker_count).build() {
                    Ok(pool) => pool.install(|| {
                        workloads.par_iter()
                            .map(|workload| self.analyze_and_save(workload, sink))
                            .collect()
                    }),
                    Err(error) => {
                        tracing::warn!(%error, worker_count, "falling back to the global rayon pool");
                        workloads.par_iter()
                            .map(|workload| self.analyze_and_save(workload, sink))
                            .collect()
                    }
                }
            }
        }
    }

    fn analyze_and_save(&self, workload: &Workload, sink: &dyn PersistenceSink) -> Result<AnalysisResult, EngineError> {
        let result = self.analyzer.analyze(&workload.taskset, &workload.platform);
        sink.save(workload.id, &result);
        result
    }
}
