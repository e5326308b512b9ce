//! LlmClient trait implementation for OpenRouterClient.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;

use crate::streaming::parse_sse_stream;
use crate::{LlmClient, LlmError, LlmResponse, Message, ToolCall, ToolDefinition};

use super::client::{parse_arguments, upstream, OpenRouterClient, OPENROUTER_API_URL};

impl OpenRouterClient {
    async fn post(
        &self,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, LlmError> {
        let response = self
            .http
            .post(OPENROUTER_API_URL)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.app_title)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(upstream(status.as_u16(), &text));
        }
        Ok(response)
    }
}

/// Folds streamed completion deltas into one normalized response, so no
/// caller ever observes a partial chunk.
#[derive(Default)]
struct StreamAccumulator {
    content: String,
    /// Tool calls arrive as fragments keyed by index: the first fragment
    /// carries id and name, later ones append to the arguments string.
    partial_tools: BTreeMap<u64, (String, String, String)>,
}

impl StreamAccumulator {
    /// Absorb one SSE data payload. Text deltas are forwarded to
    /// `on_chunk` as they arrive.
    fn absorb(&mut self, data: &str, on_chunk: &(dyn Fn(String) + Send + Sync)) {
        let Ok(json) = serde_json::from_str::<serde_json::Value>(data) else {
            return;
        };
        let delta = &json["choices"][0]["delta"];

        if let Some(text) = delta["content"].as_str() {
            if !text.is_empty() {
                self.content.push_str(text);
                on_chunk(text.to_string());
            }
        }

        if let Some(calls) = delta["tool_calls"].as_array() {
            for call in calls {
                let index = call["index"].as_u64().unwrap_or(0);
                let entry = self.partial_tools.entry(index).or_default();
                if let Some(id) = call["id"].as_str() {
                    entry.0 = id.to_string();
                }
                if let Some(name) = call["function"]["name"].as_str() {
                    entry.1 = name.to_string();
                }
                if let Some(args) = call["function"]["arguments"].as_str() {
                    entry.2.push_str(args);
                }
            }
        }
    }

    fn finish(self) -> LlmResponse {
        let tool_calls = self
            .partial_tools
            .into_values()
            .map(|(id, name, args)| ToolCall {
                id,
                name,
                arguments: parse_arguments(&serde_json::Value::String(args)),
            })
            .collect();

        LlmResponse {
            content: self.content,
            tool_calls,
        }
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn send_message(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, LlmError> {
        let body = self.build_request_body(messages, tools, false);

        debug!(model = %self.config.model, messages = messages.len(), "chat request");

        let response = self.post(&body).await?;
        let status = response.status().as_u16();
        let raw = response
            .text()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        self.parse_response(status, &raw)
    }

    async fn send_message_streaming(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        on_chunk: Box<dyn Fn(String) + Send + Sync>,
    ) -> Result<LlmResponse, LlmError> {
        let body = self.build_request_body(messages, tools, true);

        debug!(model = %self.config.model, messages = messages.len(), "chat streaming request");

        let response = self.post(&body).await?;

        let mut acc = StreamAccumulator::default();
        parse_sse_stream(response, |data| acc.absorb(data, on_chunk.as_ref())).await?;

        Ok(acc.finish())
    }
}
