pub mod collector;
pub mod instrumentation;
pub mod metrics;
pub mod monitor;
pub mod observer;

pub use collector::{MetricsCollector, MetricsSnapshot};
pub use instrumentation::Instrumentation;
pub use metrics::StageMetrics;
pub use monitor::PipelineMonitor;
pub use observer::{FrameProcessed, ProcessResult, StageObserver};
