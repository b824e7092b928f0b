pub mod policy;
pub mod resilient_stage;

pub use policy::{Backoff, RetryPolicy};
pub use resilient_stage::{ResilientStage, StageOutcome};
