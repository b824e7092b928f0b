use super::events::{
    dispatch, EventRegistry, TransportEvent, ON_ERROR, ON_FIRST_PARTICIPANT_JOINED,
    ON_PARTICIPANT_LEFT,
};
use crate::core::{Frame, FrameKind, Processor};
use crate::engine::TaskSender;
use crate::error::{ProcessorError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::{Mutex, PoisonError, RwLock};
use tokio::sync::mpsc;

/// In-process transport.
///
/// The input side pushes user audio/text into a task; the output side is a
/// processor placed at the tail of the pipeline that hands audio and text to
/// whoever holds the output receiver.
pub struct LocalTransport {
    name: String,
    events: RwLock<EventRegistry>,
    output_tx: mpsc::UnboundedSender<Frame>,
    output_rx: Mutex<Option<mpsc::UnboundedReceiver<Frame>>>,
}

impl LocalTransport {
    /// New transport with logging handlers for the lifecycle events
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let (output_tx, output_rx) = mpsc::unbounded_channel();

        let mut events = EventRegistry::new();
        let label = name.clone();
        events.on(ON_FIRST_PARTICIPANT_JOINED, move |event| {
            tracing::info!(transport = %label, "{}", event);
            Ok(())
        });
        let label = name.clone();
        events.on(ON_PARTICIPANT_LEFT, move |event| {
            tracing::info!(transport = %label, "{}", event);
            Ok(())
        });
        let label = name.clone();
        events.on(ON_ERROR, move |event| {
            tracing::error!(transport = %label, "{}", event);
            Ok(())
        });

        Self {
            name,
            events: RwLock::new(events),
            output_tx,
            output_rx: Mutex::new(Some(output_rx)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a handler for a named event
    pub fn on<F>(&self, event: &str, handler: F)
    where
        F: Fn(&TransportEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .on(event, handler);
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handler_count(event)
    }

    /// Dispatch `event` to every handler registered for it
    pub fn emit(&self, event: TransportEvent) -> usize {
        // Handlers run outside the lock so they may register more handlers
        let handlers = self
            .events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers(event.name());
        dispatch(&handlers, &event)
    }

    pub fn input(&self, sender: TaskSender) -> TransportInput {
        TransportInput { sender }
    }

    pub fn output(&self) -> TransportOutput {
        TransportOutput {
            name: format!("{}Output", self.name),
            tx: self.output_tx.clone(),
        }
    }

    /// Receiver for frames leaving the pipeline. Can only be taken once.
    pub fn take_output(&self) -> Option<mpsc::UnboundedReceiver<Frame>> {
        self.output_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Producer side of a [`LocalTransport`]
#[derive(Clone)]
pub struct TransportInput {
    sender: TaskSender,
}

impl TransportInput {
    /// Returns `Ok(false)` if the input was rejected by the interruption gate
    pub fn push_audio(
        &self,
        payload: impl Into<Bytes>,
        sample_rate: u32,
        channels: u16,
    ) -> Result<bool> {
        self.sender
            .enqueue_input(Frame::audio(payload, sample_rate, channels))
    }

    pub fn push_text(&self, content: impl Into<String>) -> Result<bool> {
        self.sender.enqueue_input(Frame::text(content))
    }

    pub fn push_frame(&self, frame: Frame) -> Result<bool> {
        self.sender.enqueue_input(frame)
    }

    pub fn sender(&self) -> &TaskSender {
        &self.sender
    }
}

/// Tail processor forwarding audio and text to the transport's output
pub struct TransportOutput {
    name: String,
    tx: mpsc::UnboundedSender<Frame>,
}

#[async_trait]
impl Processor for TransportOutput {
    fn name(&self) -> &str {
        &self.name
    }

    async fn process(&self, frame: Frame) -> std::result::Result<Option<Frame>, ProcessorError> {
        if matches!(frame.kind(), FrameKind::Audio | FrameKind::Text)
            && self.tx.send(frame.clone()).is_err()
        {
            tracing::warn!(
                transport = %self.name,
                "output receiver dropped, frame not delivered"
            );
        }
        Ok(Some(frame))
    }
}
