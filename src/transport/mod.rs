//! Transport-side collaborators: lifecycle event registry and an in-process
//! transport feeding a task and draining the pipeline tail.

pub mod events;
pub mod local;

pub use events::{
    EventHandler, EventRegistry, TransportEvent, ON_ERROR, ON_FIRST_PARTICIPANT_JOINED,
    ON_PARTICIPANT_LEFT,
};
pub use local::{LocalTransport, TransportInput, TransportOutput};
