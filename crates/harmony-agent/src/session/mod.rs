//! Conversation session management.
//!
//! A `Session` owns one conversation's ordered message history and the
//! simulated marketplace state. A `SessionWorker` wraps a session in a
//! per-session FIFO queue so turns are processed strictly sequentially,
//! in arrival order, one at a time.

mod manager;
mod state;
mod turn;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use manager::Session;
pub use state::ConversationState;
pub use worker::{spawn_session, InboundEvent, SessionHandle, SessionReply};

/// Fixed greeting for the `activate` control event. Never touches the LLM.
pub const GREETING: &str = "Hey, how can I help you?";

/// Substituted when the model returns empty or whitespace-only text.
pub const EMPTY_REPLY_FALLBACK: &str = "I'm not sure how to respond to that.";

/// The only failure text an end user ever sees. Technical detail stays in
/// the operator logs.
pub const TURN_FAILED_REPLY: &str = "Sorry, I encountered an error.";
