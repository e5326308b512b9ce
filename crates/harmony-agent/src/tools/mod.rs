//! Tool registry for the assistant.
//!
//! Tools are functions the model can call to act on the simulated
//! marketplace state (search listings, simulate a purchase, review
//! spending). Each tool pairs a [`ToolDefinition`] handed to the LLM
//! backend with a handler run against the session's state.

mod builtin;

pub use builtin::builtin_registry;

use std::collections::HashMap;

use crate::session::ConversationState;
use crate::ToolDefinition;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool arguments were missing or had the wrong shape.
    #[error("invalid arguments for tool '{tool}': {reason}")]
    Validation { tool: String, reason: String },
    /// The model requested a tool that was never registered.
    #[error("unknown tool: {0}")]
    Unknown(String),
}

/// Handler for one tool call: acts on the conversation state and returns
/// the textual result fed back to the model.
pub type ToolHandler =
    Box<dyn Fn(&mut ConversationState, &serde_json::Value) -> Result<String, ToolError> + Send + Sync>;

/// Maps tool names to handlers and keeps the descriptor list sent to the
/// LLM backend in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    definitions: Vec<ToolDefinition>,
    handlers: HashMap<String, ToolHandler>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: ToolDefinition, handler: ToolHandler) {
        self.handlers.insert(definition.name.clone(), handler);
        self.definitions.push(definition);
    }

    /// Tool descriptors in registration order, for the LLM request.
    pub fn descriptors(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Run a registered tool against the session state.
    pub fn invoke(
        &self,
        name: &str,
        args: &serde_json::Value,
        state: &mut ConversationState,
    ) -> Result<String, ToolError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| ToolError::Unknown(name.to_string()))?;
        handler(state, args)
    }
}
