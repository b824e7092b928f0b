use crate::error::{PipelineError, Result};
use crate::resilience::Backoff;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Execution options snapshotted when a task is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Whether producers may push new input while a response is in flight
    pub allow_interruptions: bool,

    /// Run metrics and observer hooks around every processor call
    pub enable_metrics: bool,

    /// Resubmit a failing frame to the same stage
    pub retry_on_error: bool,

    /// Extra attempts per frame per stage when `retry_on_error` is set
    pub max_retries: u32,

    /// Delay between retry attempts
    pub retry_backoff: Backoff,

    /// Pause between cycles when frames were re-enqueued
    pub cycle_pause_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            allow_interruptions: false,
            enable_metrics: false,
            retry_on_error: false,
            max_retries: 3,
            retry_backoff: Backoff::None,
            cycle_pause_ms: 10,
        }
    }
}

impl ExecutionConfig {
    /// Parse from a JSON object, either bare or nested under `"pipeline_config"`.
    pub fn from_json(config: Value) -> Result<Self> {
        let section = match config.get("pipeline_config") {
            Some(nested) => nested.clone(),
            None => config,
        };
        if !section.is_object() {
            return Err(PipelineError::Config(
                "execution config must be a JSON object".to_string(),
            ));
        }
        Ok(serde_json::from_value(section)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&raw)?;
        Self::from_json(value)
    }

    pub fn with_interruptions(mut self, allow: bool) -> Self {
        self.allow_interruptions = allow;
        self
    }

    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Enable per-frame retries, at most `max_retries` extra attempts
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.retry_on_error = true;
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Backoff) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Pause between cycles, rounded up to whole milliseconds so that only
    /// `Duration::ZERO` selects the yield-only mode
    pub fn with_cycle_pause(mut self, pause: Duration) -> Self {
        let millis = pause.as_micros().div_ceil(1000);
        self.cycle_pause_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }

    pub fn cycle_pause(&self) -> Duration {
        Duration::from_millis(self.cycle_pause_ms)
    }
}
