//! Per-session worker: the FIFO queue that makes turn processing strictly
//! sequential.
//!
//! Inbound events land on a bounded channel; one task drains it, so no two
//! LLM calls for the same session ever run concurrently and messages append
//! in exact arrival order. Dropping the [`SessionHandle`] closes the queue:
//! no new events are accepted, the in-flight turn runs to completion, and
//! its publish is discarded if the reply receiver is already gone.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::id::SessionId;
use crate::LlmClient;

use super::manager::Session;
use super::GREETING;

/// Queue depth per session. Events beyond this apply backpressure to the
/// transport reader rather than being dropped.
const INBOUND_QUEUE_DEPTH: usize = 64;

/// Decoded transport event, ready for sequential processing.
#[derive(Debug)]
pub enum InboundEvent {
    /// A user text turn (spoken or typed; the transport already decoded it
    /// to UTF-8).
    UserInput(String),
    /// Connection greeting request. Answered directly, bypassing the LLM.
    Activate,
}

/// One published reply. At most one per completed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionReply {
    Response(String),
    Greeting(String),
}

/// Inbound side of one session's queue. Owned by the transport connection;
/// dropping it tears the session down.
pub struct SessionHandle {
    id: SessionId,
    inbound: mpsc::Sender<InboundEvent>,
}

impl SessionHandle {
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Enqueue an event in arrival order. Returns false if the worker has
    /// already stopped.
    pub async fn submit(&self, event: InboundEvent) -> bool {
        self.inbound.send(event).await.is_ok()
    }
}

/// Spawn the worker task for one session. Replies are published on
/// `replies`; the returned join handle yields the session back once the
/// queue closes (tests use this to inspect the final transcript).
pub fn spawn_session(
    mut session: Session,
    client: Arc<dyn LlmClient>,
    replies: mpsc::Sender<SessionReply>,
) -> (SessionHandle, JoinHandle<Session>) {
    let (tx, mut rx) = mpsc::channel(INBOUND_QUEUE_DEPTH);
    let id = SessionId::new();
    let worker_id = id.clone();

    let task = tokio::spawn(async move {
        info!(session = %worker_id, "session worker started");

        while let Some(event) = rx.recv().await {
            let reply = match event {
                InboundEvent::Activate => SessionReply::Greeting(GREETING.to_string()),
                InboundEvent::UserInput(text) => {
                    SessionReply::Response(session.run_turn(client.as_ref(), text).await)
                }
            };

            // At-most-once publish; a closed receiver means the transport
            // is gone and the reply has no recipient.
            if replies.send(reply).await.is_err() {
                debug!(session = %worker_id, "reply receiver closed, discarding publish");
            }
        }

        info!(session = %worker_id, turns = session.messages().len() / 2, "session worker stopped");
        session
    });

    (SessionHandle { id, inbound: tx }, task)
}
