//! The scheduler that drives a [`PipelineTask`] to completion.
//!
//! One cycle takes the whole queue as a batch and pushes it through every
//! stage in order, one frame at a time. Survivors go back on the queue tail
//! unless one of them is the `End` sentinel, which stops the run. An empty
//! queue parks the runner until a producer enqueues or cancellation is
//! requested; nothing polls.

use crate::core::{Frame, Processor};
use crate::engine::state::{RunnerState, StopReason};
use crate::engine::{FrameQueue, Pipeline, PipelineTask};
use crate::error::{PipelineError, Result};
use crate::observability::{Instrumentation, MetricsCollector, PipelineMonitor, StageObserver};
use crate::resilience::{ResilientStage, RetryPolicy, StageOutcome};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// How a run ended
#[derive(Debug)]
pub enum Outcome {
    /// The `End` sentinel came out of the last stage
    Completed,
    /// `request_cancel` was honoured before natural completion
    Cancelled,
    /// Scheduler-level failure; processor errors never end up here
    Failed(PipelineError),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

enum CycleResult {
    Survivors(Vec<Frame>),
    Cancelled,
}

pub struct PipelineRunner {
    state: Mutex<RunnerState>,
    cancel: Mutex<CancellationToken>,
    observers: Mutex<Vec<Arc<dyn StageObserver>>>,
    metrics: Mutex<Option<MetricsCollector>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PipelineRunner {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RunnerState::Idle),
            cancel: Mutex::new(CancellationToken::new()),
            observers: Mutex::new(Vec::new()),
            metrics: Mutex::new(None),
        }
    }

    /// Get current runner state
    pub fn state(&self) -> RunnerState {
        lock(&self.state).clone()
    }

    /// Ask the current (or next) run to stop.
    ///
    /// Idempotent and safe from any thread or task. Observed at the next
    /// suspension point or between processor calls, never in the middle of
    /// one.
    pub fn request_cancel(&self) {
        let token = lock(&self.cancel).clone();
        if !token.is_cancelled() {
            tracing::debug!("pipeline cancellation requested");
            token.cancel();
        }
    }

    pub fn is_cancel_requested(&self) -> bool {
        lock(&self.cancel).is_cancelled()
    }

    /// Register an observer called around each processor invocation of runs
    /// whose task enables metrics
    pub fn add_observer(&self, observer: Arc<dyn StageObserver>) {
        lock(&self.observers).push(observer);
    }

    /// Metrics of the current or most recent run that enabled them
    pub fn monitor(&self) -> Option<PipelineMonitor> {
        lock(&self.metrics).clone().map(PipelineMonitor::new)
    }

    /// Drive `task` until the `End` sentinel, cancellation, or a fatal
    /// scheduler error.
    pub async fn run(&self, task: PipelineTask) -> Outcome {
        let span = tracing::info_span!("pipeline_run", task = task.id());
        self.run_task(task).instrument(span).await
    }

    async fn run_task(&self, task: PipelineTask) -> Outcome {
        let cancel = match self.begin(task.id()) {
            Ok(cancel) => cancel,
            Err(e) => {
                tracing::error!(error = %e, "pipeline run rejected");
                return Outcome::Failed(e);
            }
        };
        let _guard = RunGuard {
            runner: self,
            queue: task.queue().clone(),
        };

        let policy = RetryPolicy::from_config(task.config());
        let hooks = if task.config().enable_metrics {
            let collector = MetricsCollector::for_pipeline(task.pipeline());
            *lock(&self.metrics) = Some(collector.clone());
            let observers = lock(&self.observers).clone();
            Some(Instrumentation::new(collector, observers))
        } else {
            None
        };

        tracing::info!(
            stages = task.pipeline().len(),
            processors = ?task.pipeline().names(),
            "pipeline run started"
        );

        let outcome = self.schedule(&task, &policy, hooks.as_ref(), &cancel).await;

        match &outcome {
            Outcome::Completed => tracing::info!("pipeline execution completed"),
            Outcome::Cancelled => tracing::info!("pipeline execution cancelled"),
            Outcome::Failed(e) => tracing::error!(error = %e, "pipeline execution failed"),
        }
        self.finish(&outcome);
        outcome
    }

    async fn schedule(
        &self,
        task: &PipelineTask,
        policy: &RetryPolicy,
        hooks: Option<&Instrumentation>,
        cancel: &CancellationToken,
    ) -> Outcome {
        let queue = task.queue();
        let pause = task.config().cycle_pause();

        loop {
            if cancel.is_cancelled() {
                return Outcome::Cancelled;
            }

            let batch = match queue.take_all() {
                Ok(batch) => batch,
                Err(e) => return Outcome::Failed(e),
            };

            if batch.is_empty() {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Outcome::Cancelled,
                    _ = queue.notified() => continue,
                }
            }

            let cycle = self.record_cycle();
            tracing::trace!(cycle, frames = batch.len(), "cycle started");

            let survivors = match self
                .run_cycle(task.pipeline(), batch, policy, hooks, cancel)
                .await
            {
                CycleResult::Survivors(frames) => frames,
                CycleResult::Cancelled => return Outcome::Cancelled,
            };

            if survivors.iter().any(Frame::is_end) {
                tracing::info!(
                    cycle,
                    discarded = survivors.len(),
                    "received End frame, shutting down pipeline"
                );
                return Outcome::Completed;
            }

            if !survivors.is_empty() {
                tracing::trace!(cycle, frames = survivors.len(), "re-enqueuing survivors");
                if let Err(e) = queue.extend(survivors) {
                    return Outcome::Failed(match e {
                        PipelineError::TaskClosed => PipelineError::QueueState(
                            "task queue closed while its run was active".to_string(),
                        ),
                        other => other,
                    });
                }
            }

            if pause.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Outcome::Cancelled,
                    _ = tokio::time::sleep(pause) => {}
                }
            }
        }
    }

    async fn run_cycle(
        &self,
        pipeline: &Pipeline,
        batch: Vec<Frame>,
        policy: &RetryPolicy,
        hooks: Option<&Instrumentation>,
        cancel: &CancellationToken,
    ) -> CycleResult {
        let mut batch = batch;

        for (index, processor) in pipeline.processors().iter().enumerate() {
            if batch.is_empty() {
                break;
            }
            let processor: &dyn Processor = processor.as_ref();
            let stage = ResilientStage::new(index, processor, policy).with_hooks(hooks);
            let mut next = Vec::with_capacity(batch.len());

            for frame in batch {
                if cancel.is_cancelled() {
                    return CycleResult::Cancelled;
                }
                let kind = frame.kind();
                match stage.process(frame, cancel).await {
                    StageOutcome::Forwarded(output) => next.push(output),
                    StageOutcome::Dropped => {
                        tracing::trace!(stage = processor.name(), "{} frame consumed", kind);
                    }
                    StageOutcome::Failed(e) => {
                        tracing::error!(
                            stage = processor.name(),
                            error = %e,
                            "error processing {} frame, dropping it",
                            kind
                        );
                    }
                    StageOutcome::Panicked(msg) => {
                        tracing::error!(
                            stage = processor.name(),
                            panic = %msg,
                            "processor panicked on {} frame, dropping it",
                            kind
                        );
                    }
                    StageOutcome::Cancelled => return CycleResult::Cancelled,
                }
            }

            batch = next;
        }

        CycleResult::Survivors(batch)
    }

    /// Claim the runner for `task_id` and hand out the token this run obeys.
    ///
    /// The token is read under the state lock, so it is always the one
    /// installed by the previous run's `finish`.
    fn begin(&self, task_id: u64) -> Result<CancellationToken> {
        let mut state = lock(&self.state);
        if state.is_running() {
            return Err(PipelineError::Scheduler(format!(
                "runner is busy, cannot start task {}",
                task_id
            )));
        }
        Self::transition(
            &mut state,
            RunnerState::Running {
                start_time: Some(Instant::now()),
                task_id,
                cycles: 0,
            },
        )?;
        Ok(lock(&self.cancel).clone())
    }

    fn record_cycle(&self) -> u64 {
        let mut state = lock(&self.state);
        match &mut *state {
            RunnerState::Running { cycles, .. } => {
                *cycles += 1;
                *cycles
            }
            _ => 0,
        }
    }

    fn finish(&self, outcome: &Outcome) {
        let reason = match outcome {
            Outcome::Completed => StopReason::Completed,
            Outcome::Cancelled => StopReason::Cancelled,
            Outcome::Failed(e) => StopReason::Failed {
                error_msg: e.to_string(),
            },
        };

        let mut state = lock(&self.state);
        let (start_time, cycles) = match &*state {
            RunnerState::Running {
                start_time, cycles, ..
            } => (*start_time, *cycles),
            _ => (None, 0),
        };
        let stopped = RunnerState::Stopped {
            duration: start_time.map(|t| t.elapsed()),
            cycles,
            reason,
        };
        if let Err(e) = Self::transition(&mut state, stopped) {
            tracing::warn!(error = %e, "unexpected runner state at end of run");
        }
        if outcome.is_failed() {
            // Failed runs leave the runner reusable
            *state = RunnerState::Idle;
        }
        // Swapped while the state lock is held so the next `begin` never
        // picks up this run's token
        *lock(&self.cancel) = CancellationToken::new();
    }

    /// Transition to a new state with validation
    fn transition(state: &mut RunnerState, new_state: RunnerState) -> Result<()> {
        if !state.can_transition_to(&new_state) {
            return Err(PipelineError::InvalidTransition {
                from: state.name().to_string(),
                to: new_state.name().to_string(),
            });
        }
        *state = new_state;
        Ok(())
    }
}

impl Default for PipelineRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases run bookkeeping however the run ends, including when the run
/// future is dropped mid-cycle.
struct RunGuard<'a> {
    runner: &'a PipelineRunner,
    queue: Arc<FrameQueue>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.queue.close();
        let mut state = lock(&self.runner.state);
        if state.is_running() {
            // Dropped before `finish` ran: bypass validation and reset
            *state = RunnerState::Idle;
            *lock(&self.runner.cancel) = CancellationToken::new();
        }
    }
}
