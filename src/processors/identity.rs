use crate::core::{Frame, Processor};
use crate::error::ProcessorError;
use async_trait::async_trait;
use serde_json::Value;

/// Passes every frame through unchanged
pub struct Identity {
    name: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl Identity {
    pub fn new() -> Self {
        Self {
            name: "Identity".to_string(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Processor for Identity {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_create(&mut self, config: Value) -> Result<(), ProcessorError> {
        if let Some(name) = config["name"].as_str() {
            self.name = name.to_string();
        }
        Ok(())
    }

    async fn process(&self, frame: Frame) -> Result<Option<Frame>, ProcessorError> {
        Ok(Some(frame))
    }
}
