//! Conversation context shared between the user and assistant sides of an
//! LLM pipeline.
//!
//! Both aggregators returned by [`LlmContext::into_aggregators`] write into
//! the same context. The owner of the pipeline snapshots it with
//! [`ContextAggregator::context_frame`] and enqueues the result, typically
//! when the first participant joins a session.

use crate::core::{Frame, Processor};
use crate::error::ProcessorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    #[default]
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Messages plus tool declarations handed to an LLM collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmContext {
    pub messages: Vec<Message>,
    pub tools: Vec<Value>,
}

impl LlmContext {
    pub fn new(messages: Vec<Message>, tools: Vec<Value>) -> Self {
        Self { messages, tools }
    }

    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        let mut context = Self::default();
        context.push(Role::System, prompt);
        context
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
    }

    /// Control frame carrying the whole context
    pub fn to_frame(&self) -> Frame {
        Frame::control(json!({
            "type": "llm_context",
            "messages": self.messages,
            "tools": self.tools,
        }))
    }

    /// User and assistant aggregators sharing this context
    pub fn into_aggregators(self) -> (ContextAggregator, ContextAggregator) {
        let shared = Arc::new(Mutex::new(self));
        (
            ContextAggregator::new(shared.clone(), Role::User),
            ContextAggregator::new(shared, Role::Assistant),
        )
    }
}

/// Records text frames into the shared context under its role and passes
/// every frame on unchanged.
pub struct ContextAggregator {
    role: Role,
    context: Arc<Mutex<LlmContext>>,
}

impl Default for ContextAggregator {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(LlmContext::default())), Role::User)
    }
}

impl ContextAggregator {
    pub fn new(context: Arc<Mutex<LlmContext>>, role: Role) -> Self {
        Self { role, context }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    fn lock(&self) -> MutexGuard<'_, LlmContext> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn context(&self) -> LlmContext {
        self.lock().clone()
    }

    pub fn context_frame(&self) -> Frame {
        self.lock().to_frame()
    }
}

#[async_trait]
impl Processor for ContextAggregator {
    fn name(&self) -> &str {
        match self.role {
            Role::System => "SystemContextAggregator",
            Role::User => "UserContextAggregator",
            Role::Assistant => "AssistantContextAggregator",
        }
    }

    async fn on_create(&mut self, config: Value) -> Result<(), ProcessorError> {
        if let Some(role) = config.get("role") {
            self.role = serde_json::from_value(role.clone())
                .map_err(|e| ProcessorError::failed(format!("invalid aggregator role: {}", e)))?;
        }
        if let Some(prompt) = config["system_prompt"].as_str() {
            self.lock().push(Role::System, prompt);
        }
        Ok(())
    }

    async fn process(&self, frame: Frame) -> Result<Option<Frame>, ProcessorError> {
        if let Some(text) = frame.as_text() {
            self.lock().push(self.role, text);
        }
        Ok(Some(frame))
    }
}
