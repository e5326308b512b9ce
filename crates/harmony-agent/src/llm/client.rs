//! OpenRouter client struct, request building, and response parsing.

use crate::{LlmError, LlmResponse, Message, Role, ToolCall, ToolDefinition};

use super::config::LlmConfig;

pub(crate) const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// How long one completion round-trip may take before it fails the turn.
pub(crate) const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// OpenRouter chat-completions client.
pub struct OpenRouterClient {
    pub(crate) config: LlmConfig,
    pub(crate) http: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Build the JSON request body for the chat completions API.
    pub(crate) fn build_request_body(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        stream: bool,
    ) -> serde_json::Value {
        let mut msgs = Vec::new();
        for msg in messages {
            let role = match msg.role {
                Role::System => "system",
                // Tool results are folded into the transcript as user turns;
                // the content already names the tool that produced them.
                Role::User | Role::Tool => "user",
                Role::Assistant => "assistant",
            };
            msgs.push(serde_json::json!({
                "role": role,
                "content": msg.content,
            }));
        }

        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": msgs,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        });

        if !tools.is_empty() {
            let tool_defs: Vec<_> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        },
                    })
                })
                .collect();
            body["tools"] = serde_json::json!(tool_defs);
        }

        if stream {
            body["stream"] = serde_json::json!(true);
        }

        body
    }

    /// Parse a non-streaming response body. An absent `choices` field is an
    /// upstream defect; the raw body is preserved for operator logs.
    pub(crate) fn parse_response(
        &self,
        status: u16,
        raw: &str,
    ) -> Result<LlmResponse, LlmError> {
        let json: serde_json::Value =
            serde_json::from_str(raw).map_err(|_| upstream(status, raw))?;

        let message = json["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .map(|choice| &choice["message"])
            .ok_or_else(|| upstream(status, raw))?;

        let content = message["content"].as_str().unwrap_or_default().to_string();

        let tool_calls = message["tool_calls"]
            .as_array()
            .map(|calls| {
                calls
                    .iter()
                    .map(|call| ToolCall {
                        id: call["id"].as_str().unwrap_or("").to_string(),
                        name: call["function"]["name"].as_str().unwrap_or("").to_string(),
                        arguments: parse_arguments(&call["function"]["arguments"]),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            tool_calls,
        })
    }
}

/// Function arguments arrive as a JSON-encoded string; fall back to `Null`
/// if the model emitted something unparseable.
pub(crate) fn parse_arguments(raw: &serde_json::Value) -> serde_json::Value {
    match raw.as_str() {
        Some(s) => serde_json::from_str(s).unwrap_or(serde_json::Value::Null),
        None => raw.clone(),
    }
}

pub(crate) fn upstream(status: u16, body: &str) -> LlmError {
    LlmError::Upstream {
        status,
        body: body.chars().take(200).collect(),
    }
}
