use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters for one pipeline stage
pub struct StageMetrics {
    stage_index: usize,
    stage_name: String,
    frames_processed: AtomicU64,
    frames_dropped: AtomicU64,
    errors_count: AtomicU64,
    retries_count: AtomicU64,
    total_latency_us: AtomicU64,
    latency_samples: AtomicU64,
}

impl StageMetrics {
    pub fn new(stage_index: usize, stage_name: impl Into<String>) -> Self {
        Self {
            stage_index,
            stage_name: stage_name.into(),
            frames_processed: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
            errors_count: AtomicU64::new(0),
            retries_count: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            latency_samples: AtomicU64::new(0),
        }
    }

    pub fn stage_index(&self) -> usize {
        self.stage_index
    }

    pub fn stage_name(&self) -> &str {
        &self.stage_name
    }

    /// Invocations that produced an output frame
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed.load(Ordering::Relaxed)
    }

    /// Invocations that consumed their frame without output
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped.load(Ordering::Relaxed)
    }

    pub fn errors_count(&self) -> u64 {
        self.errors_count.load(Ordering::Relaxed)
    }

    pub fn retries_count(&self) -> u64 {
        self.retries_count.load(Ordering::Relaxed)
    }

    pub fn record_frame_processed(&self) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_latency(&self, latency: Duration) {
        let latency_us = latency.as_micros() as u64;
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_latency_us(&self) -> u64 {
        let samples = self.latency_samples.load(Ordering::Relaxed);
        if samples == 0 {
            return 0;
        }
        self.total_latency_us.load(Ordering::Relaxed) / samples
    }
}
