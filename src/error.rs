//! Error types for the frame pipeline.

/// Failure raised by a single processor for a single frame.
///
/// Recovered at the stage boundary: the runner logs it, drops the frame
/// (after any configured retries) and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    /// The processor cannot handle this kind of frame.
    #[error("{processor} cannot process {frame} frames")]
    Unsupported {
        processor: String,
        frame: &'static str,
    },

    /// Processor-specific failure.
    #[error("{0}")]
    Failed(String),

    /// Anything raised by a collaborator (network client, codec, ...).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProcessorError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Errors surfaced by the pipeline API and by the scheduler itself.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Queue take/enqueue synchronization was violated. Fatal to a run.
    #[error("queue state error: {0}")]
    QueueState(String),

    /// The task's run has ended and its queue no longer accepts frames.
    #[error("task queue is closed")]
    TaskClosed,

    /// Unexpected condition inside the scheduling loop. Fatal to a run.
    #[error("scheduler error: {0}")]
    Scheduler(String),

    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("unknown processor type: {0}")]
    UnknownProcessor(String),

    #[error("processor error: {0}")]
    Processor(#[from] ProcessorError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, PipelineError>;
