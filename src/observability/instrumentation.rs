use super::{FrameProcessed, MetricsCollector, ProcessResult, StageObserver};
use crate::core::Frame;
use std::sync::Arc;

/// Metrics plus user observers for one run
#[derive(Clone)]
pub struct Instrumentation {
    metrics: MetricsCollector,
    observers: Vec<Arc<dyn StageObserver>>,
}

impl Instrumentation {
    pub fn new(metrics: MetricsCollector, observers: Vec<Arc<dyn StageObserver>>) -> Self {
        Self { metrics, observers }
    }

    pub fn before(&self, stage_index: usize, stage_name: &str, frame: &Frame) {
        for observer in &self.observers {
            observer.on_process_start(stage_index, stage_name, frame);
        }
    }

    pub fn after(&self, event: &FrameProcessed) {
        if let Some(stage) = self.metrics.stage(event.stage_index) {
            stage.record_latency(event.latency);
            if event.attempt > 0 {
                stage.record_retry();
            }
            match event.result {
                ProcessResult::Forwarded(_) => stage.record_frame_processed(),
                ProcessResult::Dropped => stage.record_frame_dropped(),
                ProcessResult::Failed | ProcessResult::Panicked => stage.record_error(),
            }
        }
        for observer in &self.observers {
            observer.on_process_end(event);
        }
    }
}
