use super::RetryPolicy;
use crate::core::{Frame, Processor};
use crate::error::ProcessorError;
use crate::observability::{FrameProcessed, Instrumentation, ProcessResult};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// What happened to one frame at one stage
#[derive(Debug)]
pub enum StageOutcome {
    /// Output frame for the next stage
    Forwarded(Frame),
    /// The processor consumed the frame
    Dropped,
    /// Every attempt failed; carries the last error
    Failed(ProcessorError),
    /// The processor panicked
    Panicked(String),
    /// Cancellation arrived while waiting to retry
    Cancelled,
}

/// One processor invocation wrapped with retries, panic capture and hooks
pub struct ResilientStage<'a> {
    index: usize,
    processor: &'a dyn Processor,
    policy: &'a RetryPolicy,
    hooks: Option<&'a Instrumentation>,
}

impl<'a> ResilientStage<'a> {
    pub fn new(index: usize, processor: &'a dyn Processor, policy: &'a RetryPolicy) -> Self {
        Self {
            index,
            processor,
            policy,
            hooks: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Option<&'a Instrumentation>) -> Self {
        self.hooks = hooks;
        self
    }

    pub async fn process(&self, frame: Frame, cancel: &CancellationToken) -> StageOutcome {
        let name = self.processor.name();
        let input_kind = frame.kind();
        let mut retained = Some(frame);
        let mut attempt: u32 = 0;

        loop {
            let Some(input) = retained.take() else {
                return StageOutcome::Dropped;
            };
            // Keep a copy only while another attempt is still possible
            if attempt < self.policy.max_retries {
                retained = Some(input.clone());
            }

            if let Some(hooks) = self.hooks {
                hooks.before(self.index, name, &input);
            }
            let start = Instant::now();
            let result = AssertUnwindSafe(self.processor.process(input))
                .catch_unwind()
                .await;
            let latency = start.elapsed();

            let (outcome, process_result) = match result {
                Ok(Ok(Some(output))) => {
                    let kind = output.kind();
                    (StageOutcome::Forwarded(output), ProcessResult::Forwarded(kind))
                }
                Ok(Ok(None)) => (StageOutcome::Dropped, ProcessResult::Dropped),
                Ok(Err(e)) => (StageOutcome::Failed(e), ProcessResult::Failed),
                Err(panic) => (
                    StageOutcome::Panicked(panic_message(panic)),
                    ProcessResult::Panicked,
                ),
            };

            if let Some(hooks) = self.hooks {
                hooks.after(&FrameProcessed {
                    stage_index: self.index,
                    stage_name: name.to_string(),
                    input_kind,
                    result: process_result,
                    attempt,
                    latency,
                });
            }

            let error = match outcome {
                StageOutcome::Failed(e) => e,
                other => return other,
            };

            if attempt >= self.policy.max_retries {
                return StageOutcome::Failed(error);
            }
            attempt += 1;
            tracing::warn!(
                stage = name,
                attempt,
                max_retries = self.policy.max_retries,
                error = %error,
                "retrying {} frame",
                input_kind
            );

            let delay = self.policy.backoff.delay_for(attempt);
            if !delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return StageOutcome::Cancelled,
                    _ = tokio::time::sleep(delay) => {}
                }
            } else if cancel.is_cancelled() {
                return StageOutcome::Cancelled;
            }
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
