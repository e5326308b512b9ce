//! Scripted LLM backend for session tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{LlmClient, LlmError, LlmResponse, Message, ToolCall, ToolDefinition};

/// Pops one canned result per call, optionally after a fixed delay (to
/// keep a turn in flight while more events queue up).
pub(crate) struct ScriptedClient {
    script: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    delay: Option<Duration>,
}

impl ScriptedClient {
    pub(crate) fn new(script: Vec<Result<LlmResponse, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            delay: None,
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn text(content: &str) -> Result<LlmResponse, LlmError> {
        Ok(LlmResponse {
            content: content.to_string(),
            tool_calls: Vec::new(),
        })
    }

    pub(crate) fn tool_call(
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<LlmResponse, LlmError> {
        Ok(LlmResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: "call_1".into(),
                name: name.into(),
                arguments,
            }],
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn send_message(
        &self,
        _messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<LlmResponse, LlmError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Network("script exhausted".into())))
    }

    async fn send_message_streaming(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        _on_chunk: Box<dyn Fn(String) + Send + Sync>,
    ) -> Result<LlmResponse, LlmError> {
        self.send_message(messages, tools).await
    }
}
