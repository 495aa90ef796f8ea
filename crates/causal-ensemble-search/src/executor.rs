//! Bounded parallel execution of [`SearchTask`]s.
//!
//! # Design
//!
//! Tasks run on a dedicated rayon pool sized to `max_parallelism`. Each task
//! owns its inputs and returns an immutable result; nothing is shared
//! mutably while the batch runs. Once every task has finished, results and
//! failures are gathered in a single sequential pass.
//!
//! A failing or panicking task never aborts the batch. It shows up in
//! [`BatchOutcome::failures`] instead, so callers can decide whether the
//! remaining results are still enough.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use causal_ensemble_core::config::default_parallelism;
use causal_ensemble_core::{CoreError, CoreResult};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::task::SearchTask;

// ============================================================================
// CANCELLATION
// ============================================================================

/// Cooperative cancellation flag shared between a caller and its batches.
///
/// Tasks that have not started when the token is cancelled are skipped and
/// counted as cancelled. Tasks already running finish normally.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// ============================================================================
// OUTCOMES
// ============================================================================

/// Why one task contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// Position of the task in the submitted batch.
    pub index: usize,
    pub label: String,
    pub cause: String,
    pub panicked: bool,
}

/// A successful task result with its wall-clock duration.
#[derive(Debug, Clone)]
pub struct CompletedTask<T> {
    pub index: usize,
    pub output: T,
    pub elapsed: Duration,
}

/// Counts and failures of one batch, without the results.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub submitted: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub failures: Vec<TaskFailure>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Every submitted task produced a result.
    pub fn is_complete(&self) -> bool {
        self.completed == self.submitted
    }
}

/// Everything one call to [`ParallelExecutor::run_all`] produced.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    /// Successful results, ordered by task index.
    pub completed: Vec<CompletedTask<T>>,
    pub failures: Vec<TaskFailure>,
    pub cancelled: usize,
    pub submitted: usize,
    pub elapsed: Duration,
}

impl<T> BatchOutcome<T> {
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Splits into the bare outputs and a report.
    pub fn split(self) -> (Vec<T>, BatchReport) {
        let report = BatchReport {
            submitted: self.submitted,
            completed: self.completed.len(),
            cancelled: self.cancelled,
            failures: self.failures,
            elapsed: self.elapsed,
        };
        let outputs = self.completed.into_iter().map(|c| c.output).collect();
        (outputs, report)
    }

    /// Like [`split`](Self::split), but an outcome with no results at all is
    /// an error.
    ///
    /// # Errors
    ///
    /// - `Cancelled` if nothing completed because the batch was cancelled.
    /// - `EmptyEnsemble` if nothing completed otherwise (every task failed,
    ///   or none were submitted).
    pub fn require_results(self) -> CoreResult<(Vec<T>, BatchReport)> {
        if self.completed.is_empty() {
            if self.cancelled > 0 && self.failures.is_empty() {
                return Err(CoreError::Cancelled);
            }
            return Err(CoreError::EmptyEnsemble {
                submitted: self.submitted,
                failed: self.failures.len(),
            });
        }
        Ok(self.split())
    }
}

enum TaskSlot<T> {
    Done(CompletedTask<T>),
    Failed(TaskFailure),
    Skipped,
}

// ============================================================================
// EXECUTOR
// ============================================================================

/// Runs batches of independent tasks on at most `max_parallelism` threads.
#[derive(Debug, Clone)]
pub struct ParallelExecutor {
    max_parallelism: usize,
    cancel: Option<CancellationToken>,
}

impl Default for ParallelExecutor {
    fn default() -> Self {
        Self::new(default_parallelism())
    }
}

impl ParallelExecutor {
    /// A zero bound is raised to 1.
    pub fn new(max_parallelism: usize) -> Self {
        Self {
            max_parallelism: max_parallelism.max(1),
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn max_parallelism(&self) -> usize {
        self.max_parallelism
    }

    /// Runs every task and blocks until all have completed, failed or been
    /// skipped by cancellation.
    ///
    /// # Errors
    ///
    /// `TaskExecution` only if the worker pool cannot be created. Task
    /// failures are reported in the outcome, never as an error.
    pub fn run_all<T: SearchTask>(&self, tasks: Vec<T>) -> CoreResult<BatchOutcome<T::Output>> {
        let start = Instant::now();
        let submitted = tasks.len();
        let threads = self.max_parallelism.min(submitted).max(1);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("ensemble-worker-{}", i))
            .build()
            .map_err(|e| CoreError::TaskExecution {
                task: "worker-pool".into(),
                message: e.to_string(),
            })?;

        debug!(submitted, threads, "Starting batch");

        let cancel = self.cancel.as_ref();
        let slots: Vec<TaskSlot<T::Output>> = pool.install(|| {
            tasks
                .into_par_iter()
                .enumerate()
                .map(|(index, task)| run_one(index, task, cancel))
                .collect()
        });

        let mut completed = Vec::with_capacity(submitted);
        let mut failures = Vec::new();
        let mut cancelled = 0;
        for slot in slots {
            match slot {
                TaskSlot::Done(done) => completed.push(done),
                TaskSlot::Failed(failure) => failures.push(failure),
                TaskSlot::Skipped => cancelled += 1,
            }
        }

        let elapsed = start.elapsed();
        info!(
            submitted,
            completed = completed.len(),
            failed = failures.len(),
            cancelled,
            elapsed_ms = elapsed.as_millis() as u64,
            "Batch finished"
        );

        Ok(BatchOutcome {
            completed,
            failures,
            cancelled,
            submitted,
            elapsed,
        })
    }
}

fn run_one<T: SearchTask>(index: usize, task: T, cancel: Option<&CancellationToken>) -> TaskSlot<T::Output> {
    let label = task.label();
    if cancel.is_some_and(CancellationToken::is_cancelled) {
        debug!(task = %label, "Skipped after cancellation");
        return TaskSlot::Skipped;
    }

    let start = Instant::now();
    let result = catch_unwind(AssertUnwindSafe(|| task.run()));
    let elapsed = start.elapsed();

    match result {
        Ok(Ok(output)) => {
            debug!(task = %label, elapsed_ms = elapsed.as_millis() as u64, "Task finished");
            TaskSlot::Done(CompletedTask {
                index,
                output,
                elapsed,
            })
        }
        Ok(Err(e)) => {
            warn!(task = %label, error = %e, "Task failed, dropping its result");
            TaskSlot::Failed(TaskFailure {
                index,
                label,
                cause: e.to_string(),
                panicked: false,
            })
        }
        Err(payload) => {
            let cause = panic_message(payload.as_ref());
            warn!(task = %label, cause = %cause, "Task panicked, dropping its result");
            TaskSlot::Failed(TaskFailure {
                index,
                label,
                cause,
                panicked: true,
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Square(usize);

    impl SearchTask for Square {
        type Output = usize;

        fn label(&self) -> String {
            format!("square-{}", self.0)
        }

        fn run(self) -> CoreResult<usize> {
            match self.0 {
                3 => Err(CoreError::validation("input", "three is unlucky")),
                5 => panic!("five panics"),
                n => Ok(n * n),
            }
        }
    }

    #[test]
    fn test_failures_are_isolated() {
        let outcome = ParallelExecutor::new(4)
            .run_all((0..8).map(Square).collect())
            .unwrap();

        assert_eq!(outcome.submitted, 8);
        assert_eq!(outcome.completed_count(), 6);
        assert_eq!(outcome.failures.len(), 2);
        let panicked: Vec<_> = outcome.failures.iter().filter(|f| f.panicked).collect();
        assert_eq!(panicked.len(), 1);
        assert_eq!(panicked[0].label, "square-5");
        assert!(panicked[0].cause.contains("five panics"));

        let (outputs, report) = outcome.split();
        assert_eq!(outputs, vec![0, 1, 4, 16, 36, 49]);
        assert!(!report.is_complete());
        assert_eq!(report.failed(), 2);
        println!("[PASS] test_failures_are_isolated");
    }

    #[test]
    fn test_all_failed_is_empty_ensemble() {
        let outcome = ParallelExecutor::new(2)
            .run_all(vec![Square(3), Square(3)])
            .unwrap();
        assert!(matches!(
            outcome.require_results(),
            Err(CoreError::EmptyEnsemble { submitted: 2, failed: 2 })
        ));

        let empty = ParallelExecutor::new(2).run_all(Vec::<Square>::new()).unwrap();
        assert!(matches!(
            empty.require_results(),
            Err(CoreError::EmptyEnsemble { submitted: 0, failed: 0 })
        ));
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let outcome = ParallelExecutor::new(2)
            .with_cancellation(token)
            .run_all((0..4).map(Square).collect())
            .unwrap();
        assert_eq!(outcome.cancelled, 4);
        assert!(matches!(outcome.require_results(), Err(CoreError::Cancelled)));
    }

    #[test]
    fn test_zero_parallelism_is_raised() {
        assert_eq!(ParallelExecutor::new(0).max_parallelism(), 1);
    }
}
