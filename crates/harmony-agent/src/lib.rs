//! Agent core for Harmony.
//!
//! Provides the conversation engine behind the voice/text assistant:
//! - OpenRouter-compatible chat client with SSE streaming support
//! - Tool calling against the simulated dataset marketplace
//! - Per-session turn sequencing with ordered message history
//! - Simulated spending ledger and marketplace catalog

pub mod id;
pub mod llm;
pub mod market;
pub mod prompt;
pub mod session;
pub mod streaming;
pub mod tools;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use id::SessionId;
pub use llm::{LlmConfig, OpenRouterClient};
pub use market::{DatasetListing, LedgerEntry, Marketplace, SpendingLedger};
pub use session::{ConversationState, Session, SessionHandle};
pub use tools::{ToolError, ToolRegistry};

/// A chat backend capable of one completion round-trip.
///
/// Both methods return a single normalized [`LlmResponse`]; the streaming
/// variant accumulates all chunks internally, so callers never observe a
/// partial response.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn send_message(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, LlmError>;

    async fn send_message_streaming(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        on_chunk: Box<dyn Fn(String) + Send + Sync>,
    ) -> Result<LlmResponse, LlmError>;
}

/// One entry in a conversation. Immutable once appended; append order is
/// the sole conversation truth.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

/// A tool exposed to the LLM backend: name, description, and a JSON schema
/// for its arguments.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Normalized completion result. `tool_calls` is non-empty when the model
/// requested a function invocation instead of (or alongside) text.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

/// A structured function-call request from the model.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("configuration error: {0}")]
    Config(String),
    /// HTTP failure or malformed upstream payload. Carries the status and a
    /// truncated raw body for operator logs; never shown to the end user.
    #[error("upstream error: HTTP {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("rate limited")]
    RateLimited,
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout")]
    Timeout,
}
