use crate::core::{Frame, FrameKind, Processor};
use crate::error::ProcessorError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;

/// Drops frames of the configured kinds.
///
/// `End` always passes so a filter can never swallow the shutdown signal.
#[derive(Default)]
pub struct KindFilter {
    dropped: HashSet<FrameKind>,
}

impl KindFilter {
    pub fn dropping(kinds: impl IntoIterator<Item = FrameKind>) -> Self {
        Self {
            dropped: kinds.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Processor for KindFilter {
    fn name(&self) -> &str {
        "KindFilter"
    }

    async fn on_create(&mut self, config: Value) -> Result<(), ProcessorError> {
        if let Some(drop) = config.get("drop") {
            let kinds: Vec<FrameKind> = serde_json::from_value(drop.clone())
                .map_err(|e| ProcessorError::failed(format!("invalid kind_filter drop list: {}", e)))?;
            self.dropped = kinds.into_iter().collect();
        }
        Ok(())
    }

    async fn process(&self, frame: Frame) -> Result<Option<Frame>, ProcessorError> {
        if !frame.is_end() && self.dropped.contains(&frame.kind()) {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}
