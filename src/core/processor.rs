use super::Frame;
use crate::error::ProcessorError;
use async_trait::async_trait;
use serde_json::Value;

/// Base trait for every stage of a pipeline.
///
/// A pipeline is shared read-only by the runs built on it, so `process`
/// takes `&self`; stateful processors keep their state behind a lock or
/// atomics.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Human-readable stage name used in logs and metrics
    fn name(&self) -> &str;

    /// Called once when the processor is built from a JSON description
    async fn on_create(&mut self, _config: Value) -> Result<(), ProcessorError> {
        Ok(())
    }

    /// Handle one frame.
    ///
    /// `Ok(None)` consumes the frame. Returning a frame of a different kind
    /// is allowed (e.g. audio in, text out). Must not block indefinitely.
    async fn process(&self, frame: Frame) -> Result<Option<Frame>, ProcessorError>;
}
