use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub const ON_FIRST_PARTICIPANT_JOINED: &str = "on_first_participant_joined";
pub const ON_PARTICIPANT_LEFT: &str = "on_participant_left";
pub const ON_ERROR: &str = "on_error";

/// Session lifecycle events raised by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    FirstParticipantJoined { participant: String },
    ParticipantLeft { participant: String, reason: String },
    Error { message: String },
}

impl TransportEvent {
    /// Registry key handlers are registered under
    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstParticipantJoined { .. } => ON_FIRST_PARTICIPANT_JOINED,
            Self::ParticipantLeft { .. } => ON_PARTICIPANT_LEFT,
            Self::Error { .. } => ON_ERROR,
        }
    }
}

impl fmt::Display for TransportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstParticipantJoined { participant } => {
                write!(f, "{} joined", participant)
            }
            Self::ParticipantLeft {
                participant,
                reason,
            } => write!(f, "{} left ({})", participant, reason),
            Self::Error { message } => write!(f, "transport error: {}", message),
        }
    }
}

pub type EventHandler = Arc<dyn Fn(&TransportEvent) -> anyhow::Result<()> + Send + Sync>;

/// Event name to ordered handler list.
///
/// Multi-dispatch: `emit` runs every handler registered under the event's
/// name, in registration order. A failing handler is logged and the rest
/// still run.
#[derive(Clone, Default)]
pub struct EventRegistry {
    handlers: HashMap<String, Vec<EventHandler>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, event: &str, handler: F)
    where
        F: Fn(&TransportEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    pub fn handlers(&self, event: &str) -> Vec<EventHandler> {
        self.handlers.get(event).cloned().unwrap_or_default()
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map(Vec::len).unwrap_or(0)
    }

    /// Invoke the handlers for `event`; returns how many ran
    pub fn emit(&self, event: &TransportEvent) -> usize {
        dispatch(&self.handlers(event.name()), event)
    }
}

/// Run `handlers` in order, logging failures
pub(crate) fn dispatch(handlers: &[EventHandler], event: &TransportEvent) -> usize {
    for (index, handler) in handlers.iter().enumerate() {
        if let Err(e) = handler(event) {
            tracing::error!(
                event = event.name(),
                handler = index,
                error = %e,
                "event handler failed"
            );
        }
    }
    handlers.len()
}
