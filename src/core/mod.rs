pub mod frame;
pub mod processor;

pub use frame::{AudioFrame, ControlFrame, Frame, FrameKind, TextFrame};
pub use processor::Processor;
