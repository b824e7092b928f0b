use crate::core::{Frame, Processor};
use crate::error::ProcessorError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// Logs every frame it sees and passes it on
pub struct FrameLogger {
    label: String,
    seen: AtomicU64,
}

impl Default for FrameLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLogger {
    pub fn new() -> Self {
        Self {
            label: "Output".to_string(),
            seen: AtomicU64::new(0),
        }
    }

    pub fn frames_seen(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Processor for FrameLogger {
    fn name(&self) -> &str {
        "FrameLogger"
    }

    async fn on_create(&mut self, config: Value) -> Result<(), ProcessorError> {
        if let Some(label) = config["label"].as_str() {
            self.label = label.to_string();
        }
        Ok(())
    }

    async fn process(&self, frame: Frame) -> Result<Option<Frame>, ProcessorError> {
        let n = self.seen.fetch_add(1, Ordering::Relaxed) + 1;

        match &frame {
            Frame::Audio(audio) => tracing::info!(
                label = %self.label,
                n,
                bytes = audio.payload.len(),
                duration_ms = audio.duration().as_millis() as u64,
                "{}",
                frame
            ),
            _ => tracing::info!(label = %self.label, n, "{}", frame),
        }

        Ok(Some(frame))
    }
}
