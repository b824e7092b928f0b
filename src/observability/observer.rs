//! Hooks invoked around every processor call when metrics are enabled.
//!
//! Observers watch frames move through the stages without being part of the
//! pipeline. They are called inline by the runner, so implementations must be
//! quick and must not block.
//!
//! ```rust
//! use framepipe::observability::{FrameProcessed, StageObserver};
//!
//! struct SlowStageAlarm;
//!
//! impl StageObserver for SlowStageAlarm {
//!     fn on_process_end(&self, event: &FrameProcessed) {
//!         if event.latency.as_millis() > 50 {
//!             eprintln!("{} took {:?}", event.stage_name, event.latency);
//!         }
//!     }
//! }
//! ```

use crate::core::{Frame, FrameKind};
use std::time::Duration;

/// Result of a single processor invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// The stage produced a frame of this kind
    Forwarded(FrameKind),
    /// The stage consumed the frame
    Dropped,
    /// The stage returned an error
    Failed,
    /// The stage panicked
    Panicked,
}

/// Event data for one processor invocation.
#[derive(Debug, Clone)]
pub struct FrameProcessed {
    /// Position of the stage in the pipeline.
    pub stage_index: usize,
    /// Name reported by the processor.
    pub stage_name: String,
    /// Kind of the frame handed to the stage.
    pub input_kind: FrameKind,
    pub result: ProcessResult,
    /// 0 for the first attempt, n for the n-th retry.
    pub attempt: u32,
    pub latency: Duration,
}

pub trait StageObserver: Send + Sync {
    fn on_process_start(&self, _stage_index: usize, _stage_name: &str, _frame: &Frame) {}

    fn on_process_end(&self, _event: &FrameProcessed) {}
}
