use crate::core::{Frame, Processor};
use crate::error::ProcessorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCase {
    #[default]
    Uppercase,
    Lowercase,
    Trim,
}

/// Rewrites text frames; other kinds pass through
#[derive(Default)]
pub struct TextTransform {
    mode: TextCase,
}

impl TextTransform {
    pub fn new(mode: TextCase) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> TextCase {
        self.mode
    }
}

#[async_trait]
impl Processor for TextTransform {
    fn name(&self) -> &str {
        "TextTransform"
    }

    async fn on_create(&mut self, config: Value) -> Result<(), ProcessorError> {
        if let Some(mode) = config.get("mode") {
            self.mode = serde_json::from_value(mode.clone())
                .map_err(|e| ProcessorError::failed(format!("invalid text_transform mode: {}", e)))?;
        }
        Ok(())
    }

    async fn process(&self, frame: Frame) -> Result<Option<Frame>, ProcessorError> {
        let text = match frame {
            Frame::Text(text) => text.content,
            other => return Ok(Some(other)),
        };
        let rewritten = match self.mode {
            TextCase::Uppercase => text.to_uppercase(),
            TextCase::Lowercase => text.to_lowercase(),
            TextCase::Trim => text.trim().to_string(),
        };
        Ok(Some(Frame::text(rewritten)))
    }
}
