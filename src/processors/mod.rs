pub mod audio_gain;
pub mod context;
pub mod frame_logger;
pub mod identity;
pub mod kind_filter;
pub mod text_transform;

pub use audio_gain::AudioGain;
pub use context::{ContextAggregator, LlmContext, Message, Role};
pub use frame_logger::FrameLogger;
pub use identity::Identity;
pub use kind_filter::KindFilter;
pub use text_transform::{TextCase, TextTransform};
