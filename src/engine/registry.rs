use crate::core::Processor;
use crate::error::{PipelineError, Result};
use crate::processors::{AudioGain, ContextAggregator, FrameLogger, Identity, KindFilter, TextTransform};
use std::collections::HashMap;

type ProcessorFactory = Box<dyn Fn() -> Box<dyn Processor> + Send + Sync>;

/// Registry of processor types available to [`Pipeline::from_json`](super::Pipeline::from_json)
pub struct ProcessorRegistry {
    factories: HashMap<String, ProcessorFactory>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry preloaded with the processors shipped in this crate
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("identity", || Box::new(Identity::new()));
        registry.register("text_transform", || Box::new(TextTransform::default()));
        registry.register("kind_filter", || Box::new(KindFilter::default()));
        registry.register("frame_logger", || Box::new(FrameLogger::new()));
        registry.register("audio_gain", || Box::new(AudioGain::new()));
        registry.register("context_aggregator", || Box::new(ContextAggregator::default()));
        registry
    }

    pub fn register<F>(&mut self, processor_type: &str, factory: F)
    where
        F: Fn() -> Box<dyn Processor> + Send + Sync + 'static,
    {
        self.factories
            .insert(processor_type.to_string(), Box::new(factory));
    }

    pub fn create(&self, processor_type: &str) -> Result<Box<dyn Processor>> {
        self.factories
            .get(processor_type)
            .ok_or_else(|| PipelineError::UnknownProcessor(processor_type.to_string()))
            .map(|factory| factory())
    }

    pub fn contains(&self, processor_type: &str) -> bool {
        self.factories.contains_key(processor_type)
    }

    pub fn list_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.keys().cloned().collect();
        types.sort();
        types
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
