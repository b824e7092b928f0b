use super::StageMetrics;
use crate::engine::Pipeline;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub stage_index: usize,
    pub stage_name: String,
    pub frames_processed: u64,
    pub frames_dropped: u64,
    pub errors_count: u64,
    pub retries_count: u64,
    pub avg_latency_us: u64,
}

/// Per-stage metrics for one pipeline, kept in stage order
#[derive(Clone)]
pub struct MetricsCollector {
    metrics: Vec<Arc<StageMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            metrics: Vec::new(),
        }
    }

    /// One fresh [`StageMetrics`] per processor of `pipeline`
    pub fn for_pipeline(pipeline: &Pipeline) -> Self {
        let mut collector = Self::new();
        for (index, name) in pipeline.names().into_iter().enumerate() {
            collector.register(Arc::new(StageMetrics::new(index, name)));
        }
        collector
    }

    pub fn register(&mut self, metrics: Arc<StageMetrics>) {
        self.metrics.push(metrics);
    }

    pub fn stage(&self, index: usize) -> Option<Arc<StageMetrics>> {
        self.metrics
            .iter()
            .find(|m| m.stage_index() == index)
            .cloned()
    }

    /// First stage registered under `name`
    pub fn get_stage_metrics(&self, name: &str) -> Option<Arc<StageMetrics>> {
        self.metrics
            .iter()
            .find(|m| m.stage_name() == name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn snapshot(&self) -> Vec<MetricsSnapshot> {
        self.metrics
            .iter()
            .map(|metrics| MetricsSnapshot {
                stage_index: metrics.stage_index(),
                stage_name: metrics.stage_name().to_string(),
                frames_processed: metrics.frames_processed(),
                frames_dropped: metrics.frames_dropped(),
                errors_count: metrics.errors_count(),
                retries_count: metrics.retries_count(),
                avg_latency_us: metrics.avg_latency_us(),
            })
            .collect()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
