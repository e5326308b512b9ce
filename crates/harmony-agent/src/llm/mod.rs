//! OpenRouter chat-completions client.
//!
//! One round-trip (or streamed) completion call, normalized into a single
//! [`crate::LlmResponse`]. Retry policy lives with the caller; a failed
//! call fails the turn.

mod api;
mod client;
mod config;

pub use client::OpenRouterClient;
pub use config::LlmConfig;
