//! Turn processing: one user message in, exactly one assistant reply out.

use tracing::{debug, error, warn};

use crate::tools::ToolError;
use crate::{LlmClient, LlmError, Message, Role};

use super::manager::Session;
use super::{EMPTY_REPLY_FALLBACK, TURN_FAILED_REPLY};

#[derive(Debug, thiserror::Error)]
enum TurnError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl Session {
    /// Process one user turn to completion. Appends the user message and
    /// exactly one assistant message; any failure becomes the fixed error
    /// reply, so the transcript keeps strict user/assistant alternation.
    pub async fn run_turn(
        &mut self,
        client: &dyn LlmClient,
        user_text: impl Into<String>,
    ) -> String {
        self.state.push(Role::User, user_text);

        let reply = match self.drive_llm(client).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "turn failed");
                TURN_FAILED_REPLY.to_string()
            }
        };

        self.state.push(Role::Assistant, reply.clone());
        reply
    }

    /// One completion round, plus at most one tool round. Tool results are
    /// transient context for the follow-up call only; durable history keeps
    /// just the user turn and the final assistant reply.
    async fn drive_llm(&mut self, client: &dyn LlmClient) -> Result<String, TurnError> {
        let mut messages = self.build_messages();

        let response = client
            .send_message(&messages, self.registry.descriptors())
            .await?;

        let text = if response.tool_calls.is_empty() {
            response.content
        } else {
            if response.tool_calls.len() > 1 {
                debug!(
                    dropped = response.tool_calls.len() - 1,
                    "only the first tool call of a turn is executed"
                );
            }
            let call = &response.tool_calls[0];
            debug!(tool = %call.name, "executing tool call");
            let result = self
                .registry
                .invoke(&call.name, &call.arguments, &mut self.state)?;

            if !response.content.trim().is_empty() {
                messages.push(Message::new(Role::Assistant, response.content.clone()));
            }
            messages.push(Message::new(
                Role::Tool,
                format!("[Tool Result: {}]\n{}", call.name, result),
            ));

            // The follow-up call carries no tool descriptors, so the model
            // must answer in text. One tool round per turn, never more.
            client.send_message(&messages, &[]).await?.content
        };

        if text.trim().is_empty() {
            warn!("empty LLM reply, substituting fallback");
            Ok(EMPTY_REPLY_FALLBACK.to_string())
        } else {
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::testing::ScriptedClient;
    use super::super::ConversationState;
    use super::*;
    use crate::tools::builtin_registry;
    use crate::prompt::SYSTEM_PROMPT;

    fn session() -> Session {
        Session::new(ConversationState::demo())
            .with_system_prompt(SYSTEM_PROMPT)
            .with_registry(builtin_registry())
    }

    fn roles(session: &Session) -> Vec<Role> {
        session.messages().iter().map(|m| m.role).collect()
    }

    #[tokio::test]
    async fn plain_turn_appends_user_then_assistant() {
        let client = ScriptedClient::new(vec![ScriptedClient::text("Happy to help.")]);
        let mut session = session();

        let reply = session.run_turn(&client, "hello").await;
        assert_eq!(reply, "Happy to help.");
        assert_eq!(roles(&session), vec![Role::User, Role::Assistant]);
        assert_eq!(session.messages()[1].content, "Happy to help.");
    }

    #[tokio::test]
    async fn empty_reply_becomes_fallback() {
        let client = ScriptedClient::new(vec![ScriptedClient::text("   \n ")]);
        let mut session = session();

        let reply = session.run_turn(&client, "hello").await;
        assert_eq!(reply, EMPTY_REPLY_FALLBACK);
        // The fallback, not the empty string, is what history records.
        assert_eq!(session.messages()[1].content, EMPTY_REPLY_FALLBACK);
    }

    #[tokio::test]
    async fn llm_failure_still_appends_assistant_turn() {
        let client = ScriptedClient::new(vec![Err(LlmError::Network("connection reset".into()))]);
        let mut session = session();

        let reply = session.run_turn(&client, "hello").await;
        assert_eq!(reply, TURN_FAILED_REPLY);
        assert_eq!(roles(&session), vec![Role::User, Role::Assistant]);
        assert_eq!(session.messages()[1].content, TURN_FAILED_REPLY);
    }

    #[tokio::test]
    async fn tool_call_runs_once_then_final_reply() {
        let client = ScriptedClient::new(vec![
            ScriptedClient::tool_call("simulate_purchase", json!({"dataset_id": "ds003"})),
            ScriptedClient::text("Done. The corpus is yours, 8 MNEE recorded."),
        ]);
        let mut session = session();

        let reply = session.run_turn(&client, "buy ds003 please").await;
        assert_eq!(reply, "Done. The corpus is yours, 8 MNEE recorded.");
        // The purchase actually hit the ledger.
        assert_eq!(session.state().ledger().entries().len(), 3);
        // Tool traffic stays out of the durable transcript.
        assert_eq!(roles(&session), vec![Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn unknown_tool_fails_the_turn() {
        let client = ScriptedClient::new(vec![ScriptedClient::tool_call(
            "transfer_funds",
            json!({"amount": 1_000_000}),
        )]);
        let mut session = session();

        let reply = session.run_turn(&client, "send it all").await;
        assert_eq!(reply, TURN_FAILED_REPLY);
        assert_eq!(roles(&session), vec![Role::User, Role::Assistant]);
        // No ledger damage from the bogus call.
        assert_eq!(session.state().ledger().entries().len(), 2);
    }

    #[tokio::test]
    async fn malformed_tool_arguments_fail_the_turn() {
        let client = ScriptedClient::new(vec![ScriptedClient::tool_call(
            "simulate_purchase",
            json!({"dataset": "ds003"}),
        )]);
        let mut session = session();

        let reply = session.run_turn(&client, "buy it").await;
        assert_eq!(reply, TURN_FAILED_REPLY);
        assert_eq!(session.state().ledger().entries().len(), 2);
    }

    #[tokio::test]
    async fn alternation_holds_across_mixed_turns() {
        let client = ScriptedClient::new(vec![
            ScriptedClient::text("First reply."),
            Err(LlmError::Timeout),
            ScriptedClient::text("Back again."),
        ]);
        let mut session = session();

        session.run_turn(&client, "one").await;
        session.run_turn(&client, "two").await;
        session.run_turn(&client, "three").await;

        assert_eq!(
            roles(&session),
            vec![
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
            ]
        );
    }
}
