use crate::core::Processor;
use crate::engine::ProcessorRegistry;
use crate::error::{PipelineError, Result};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Ordered, immutable chain of processors.
///
/// Cloning is cheap and every clone shares the same processors, so one
/// pipeline can back several tasks.
#[derive(Clone)]
pub struct Pipeline {
    processors: Arc<[Box<dyn Processor>]>,
}

impl Pipeline {
    /// Stores the processors verbatim. Adjacent stages are not checked for
    /// compatibility; a mismatch shows up as processor errors at run time.
    pub fn new(processors: Vec<Box<dyn Processor>>) -> Self {
        Self {
            processors: processors.into(),
        }
    }

    /// Build from `{"processors": [{"type": ..., "config": {...}}, ...]}`.
    pub async fn from_json(config: Value, registry: &ProcessorRegistry) -> Result<Self> {
        let mut processors: Vec<Box<dyn Processor>> = Vec::new();

        let entries = config["processors"]
            .as_array()
            .ok_or_else(|| PipelineError::Config("missing \"processors\" array".to_string()))?;

        for (index, entry) in entries.iter().enumerate() {
            let processor_type = entry["type"].as_str().ok_or_else(|| {
                PipelineError::Config(format!("processor #{} missing type", index))
            })?;
            let processor_cfg = match entry.get("config") {
                Some(cfg) => cfg.clone(),
                None => Value::Object(Default::default()),
            };

            let mut processor = registry.create(processor_type)?;
            processor.on_create(processor_cfg).await?;
            processors.push(processor);
        }

        Ok(Self::new(processors))
    }

    pub fn processors(&self) -> &[Box<dyn Processor>] {
        &self.processors
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("processors", &self.names())
            .finish()
    }
}
