//! Frame pipeline engine.
//!
//! Frames (audio chunks, text, control signals and the `End` sentinel) are
//! queued on a [`PipelineTask`](engine::PipelineTask) and driven through an
//! ordered chain of [`Processor`](core::Processor)s by a
//! [`PipelineRunner`](engine::PipelineRunner).

pub mod core;
pub mod engine;
pub mod error;
pub mod logging;
pub mod observability;
pub mod processors;
pub mod resilience;
pub mod transport;

pub use error::{PipelineError, ProcessorError, Result};
