use crate::core::{Frame, FrameKind};
use crate::engine::{ExecutionConfig, FrameQueue, Pipeline};
use crate::error::Result;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// One logical session: a pipeline, its execution options and a frame queue.
///
/// Handed to exactly one [`PipelineRunner::run`](super::PipelineRunner::run).
/// Producers that need to keep enqueuing while the run owns the task hold a
/// [`TaskSender`].
pub struct PipelineTask {
    id: u64,
    pipeline: Pipeline,
    config: ExecutionConfig,
    queue: Arc<FrameQueue>,
    response_in_flight: Arc<AtomicBool>,
}

impl PipelineTask {
    pub fn new(pipeline: Pipeline, config: ExecutionConfig) -> Self {
        Self {
            id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed),
            pipeline,
            config,
            queue: Arc::new(FrameQueue::new()),
            response_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    pub fn enqueue_one(&self, frame: Frame) -> Result<()> {
        self.queue.push(frame)
    }

    pub fn enqueue_many<I>(&self, frames: I) -> Result<()>
    where
        I: IntoIterator<Item = Frame>,
    {
        self.queue.extend(frames)
    }

    /// Producer handle that outlives the move of the task into a run
    pub fn sender(&self) -> TaskSender {
        TaskSender {
            task_id: self.id,
            queue: self.queue.clone(),
            response_in_flight: self.response_in_flight.clone(),
            allow_interruptions: self.config.allow_interruptions,
        }
    }

    /// Frames waiting for the next cycle, oldest first
    pub fn pending(&self) -> Vec<Frame> {
        self.queue.snapshot()
    }

    pub(crate) fn queue(&self) -> &Arc<FrameQueue> {
        &self.queue
    }
}

/// Cloneable enqueue side of a [`PipelineTask`]
#[derive(Clone)]
pub struct TaskSender {
    task_id: u64,
    queue: Arc<FrameQueue>,
    response_in_flight: Arc<AtomicBool>,
    allow_interruptions: bool,
}

impl TaskSender {
    pub fn task_id(&self) -> u64 {
        self.task_id
    }

    pub fn enqueue_one(&self, frame: Frame) -> Result<()> {
        self.queue.push(frame)
    }

    pub fn enqueue_many<I>(&self, frames: I) -> Result<()>
    where
        I: IntoIterator<Item = Frame>,
    {
        self.queue.extend(frames)
    }

    /// Enqueue user input, honouring `allow_interruptions`.
    ///
    /// Returns `Ok(false)` when audio/text input was rejected because a
    /// response is in flight and interruptions are disabled. Control and
    /// `End` frames are always admitted.
    pub fn enqueue_input(&self, frame: Frame) -> Result<bool> {
        let interruptible = matches!(frame.kind(), FrameKind::Audio | FrameKind::Text);
        if interruptible && !self.allow_interruptions && self.is_response_in_flight() {
            tracing::debug!(
                task = self.task_id,
                frame = %frame,
                "rejecting input while a response is in flight"
            );
            return Ok(false);
        }
        self.queue.push(frame)?;
        Ok(true)
    }

    /// Mark the start/end of a bot response
    pub fn set_response_in_flight(&self, in_flight: bool) {
        self.response_in_flight.store(in_flight, Ordering::Release);
    }

    pub fn is_response_in_flight(&self) -> bool {
        self.response_in_flight.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Frames waiting for the next cycle, oldest first
    pub fn pending(&self) -> Vec<Frame> {
        self.queue.snapshot()
    }
}
