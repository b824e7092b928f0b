pub mod config;
pub mod pipeline;
pub mod queue;
pub mod registry;
pub mod runner;
pub mod state;
pub mod task;

pub use config::ExecutionConfig;
pub use pipeline::Pipeline;
pub use queue::FrameQueue;
pub use registry::ProcessorRegistry;
pub use runner::{Outcome, PipelineRunner};
pub use state::{RunnerState, StopReason};
pub use task::{PipelineTask, TaskSender};
