//! Batch orchestration over a list of instruments.
//!
//! A run moves `Idle -> Running -> Completed`. Instruments are processed in
//! fixed-size batches: every member of a batch is polled concurrently on the
//! caller's task, the batch is a join barrier, and consecutive batches are
//! separated by a pacing delay. Results and errors are written only here,
//! after each member future settles.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calendar::ReferenceDate;
use crate::resolver::InstrumentResolver;
use crate::{Instrument, OrchestratorError, PriceResult, RunError, ValidationError};

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1_500);

/// Batch partitioning and inter-batch pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    pub batch_size: usize,
    /// Sleep between consecutive batches, never after the last one.
    pub batch_delay: Duration,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Completed,
}

/// Receives `(completed, total, detail)` once at start and after every
/// instrument settles.
pub trait ProgressSink {
    fn report(&self, completed: usize, total: usize, detail: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize, &str),
{
    fn report(&self, completed: usize, total: usize, detail: &str) {
        self(completed, total, detail)
    }
}

/// Progress sink that discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _completed: usize, _total: usize, _detail: &str) {}
}

/// Output of one orchestrator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRun {
    pub run_id: Uuid,
    pub reference_date: ReferenceDate,
    /// Keyed by the instrument's raw exchange code.
    pub results: BTreeMap<String, PriceResult>,
    /// Failed instruments in completion order.
    pub errors: Vec<RunError>,
    pub batches: usize,
    pub pauses: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub batches: usize,
    pub pauses: usize,
}

impl ReconciliationRun {
    fn new(reference_date: ReferenceDate) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            reference_date,
            results: BTreeMap::new(),
            errors: Vec::new(),
            batches: 0,
            pauses: 0,
        }
    }

    pub fn summary(&self) -> RunSummary {
        let failed = self.results.values().filter(|r| r.is_error()).count();
        RunSummary {
            total: self.results.len(),
            succeeded: self.results.len() - failed,
            failed,
            batches: self.batches,
            pauses: self.pauses,
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub struct BatchOrchestrator {
    resolver: InstrumentResolver,
    policy: BatchPolicy,
    state: Mutex<RunState>,
}

impl BatchOrchestrator {
    pub fn new(resolver: InstrumentResolver, policy: BatchPolicy) -> Result<Self, ValidationError> {
        if policy.batch_size == 0 {
            return Err(ValidationError::ZeroBatchSize);
        }
        Ok(Self {
            resolver,
            policy,
            state: Mutex::new(RunState::Idle),
        })
    }

    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub const fn policy(&self) -> BatchPolicy {
        self.policy
    }

    /// Reconcile `instruments` against the reference date for the current instant.
    pub async fn run(
        &self,
        instruments: &[Instrument],
        progress: &dyn ProgressSink,
    ) -> Result<ReconciliationRun, OrchestratorError> {
        self.run_at(OffsetDateTime::now_utc(), instruments, progress)
            .await
    }

    /// Reconcile as if the run started at `now`.
    pub async fn run_at(
        &self,
        now: OffsetDateTime,
        instruments: &[Instrument],
        progress: &dyn ProgressSink,
    ) -> Result<ReconciliationRun, OrchestratorError> {
        let reference = self.resolver.calendar().reference_date(now);
        self.run_for_date(reference, instruments, progress).await
    }

    /// Reconcile against an explicit reference date.
    pub async fn run_for_date(
        &self,
        reference: ReferenceDate,
        instruments: &[Instrument],
        progress: &dyn ProgressSink,
    ) -> Result<ReconciliationRun, OrchestratorError> {
        if instruments.is_empty() {
            return Err(OrchestratorError::EmptyInput);
        }
        let mut guard = RunGuard::acquire(&self.state)?;

        let total = instruments.len();
        let mut run = ReconciliationRun::new(reference);
        info!(
            run_id = %run.run_id,
            reference_date = %reference,
            total,
            batch_size = self.policy.batch_size,
            provider = self.resolver.provider_name(),
            "reconciliation started"
        );
        progress.report(0, total, "starting");

        let mut completed = 0;
        for (index, batch) in instruments.chunks(self.policy.batch_size).enumerate() {
            if index > 0 {
                run.pauses += 1;
                tokio::time::sleep(self.policy.batch_delay).await;
            }
            run.batches += 1;

            let mut pending = batch
                .iter()
                .map(|instrument| async move {
                    let result = self.resolver.resolve(&instrument.ticker, reference).await;
                    (instrument, result)
                })
                .collect::<FuturesUnordered<_>>();

            while let Some((instrument, result)) = pending.next().await {
                completed += 1;
                if let Some(error) = &result.error {
                    warn!(
                        run_id = %run.run_id,
                        batch = index,
                        code = %instrument.code,
                        ticker = %instrument.ticker,
                        error = %error,
                        "instrument failed"
                    );
                    run.errors.push(RunError::new(instrument, error.clone()));
                }
                let detail = format!("{} {}", instrument.code, instrument.name);
                progress.report(completed, total, detail.trim_end());
                run.results.insert(instrument.code.clone(), result);
            }
        }

        guard.complete();
        info!(
            run_id = %run.run_id,
            succeeded = total - run.errors.len(),
            failed = run.errors.len(),
            batches = run.batches,
            "reconciliation completed"
        );
        Ok(run)
    }
}

/// Holds the `Running` state for the lifetime of a run.
///
/// A run dropped before completion returns the orchestrator to `Idle`.
struct RunGuard<'a> {
    state: &'a Mutex<RunState>,
    completed: bool,
}

impl<'a> RunGuard<'a> {
    fn acquire(state: &'a Mutex<RunState>) -> Result<Self, OrchestratorError> {
        let mut current = state.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == RunState::Running {
            return Err(OrchestratorError::AlreadyRunning);
        }
        *current = RunState::Running;
        Ok(Self {
            state,
            completed: false,
        })
    }

    fn complete(&mut self) {
        self.completed = true;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut current = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *current = if self.completed {
            RunState::Completed
        } else {
            RunState::Idle
        };
    }
}
