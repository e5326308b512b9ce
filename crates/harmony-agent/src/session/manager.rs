//! Session struct and conversation accessors.

use crate::tools::ToolRegistry;
use crate::{Message, Role};

use super::state::ConversationState;

/// One conversation: state, system prompt, and the tool set exposed to the
/// model. Turn processing is in `turn.rs`.
pub struct Session {
    pub(super) state: ConversationState,
    pub(super) system_prompt: Option<String>,
    pub(super) registry: ToolRegistry,
}

impl Session {
    pub fn new(state: ConversationState) -> Self {
        Self {
            state,
            system_prompt: None,
            registry: ToolRegistry::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_registry(mut self, registry: ToolRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// History plus the system prompt prepended, as sent to the backend.
    pub(super) fn build_messages(&self) -> Vec<Message> {
        let mut msgs = Vec::new();
        if let Some(ref system) = self.system_prompt {
            msgs.push(Message::new(Role::System, system.clone()));
        }
        msgs.extend(self.state.messages().iter().cloned());
        msgs
    }

    /// The durable conversation history.
    pub fn messages(&self) -> &[Message] {
        self.state.messages()
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }
}
