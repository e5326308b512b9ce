//! Per-connection handler: one WebSocket, one session, one worker.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use harmony_agent::prompt::SYSTEM_PROMPT;
use harmony_agent::session::{
    spawn_session, ConversationState, InboundEvent, Session, SessionHandle, SessionReply,
    TURN_FAILED_REPLY,
};
use harmony_agent::tools::builtin_registry;
use harmony_agent::LlmClient;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::SessionRegistry;
use crate::token::TokenConfig;

type WsStream = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;
type WsSink = futures_util::stream::SplitSink<WsStream, Message>;

/// Drive a single WebSocket connection until it closes. The session worker
/// serializes turns; this loop only shuttles frames.
pub async fn handle_connection(
    ws: WsStream,
    addr: SocketAddr,
    registry: SessionRegistry,
    llm: Arc<dyn LlmClient>,
    tokens: Option<TokenConfig>,
) {
    let (mut sink, mut stream) = ws.split();

    let session = Session::new(ConversationState::demo())
        .with_system_prompt(SYSTEM_PROMPT)
        .with_registry(builtin_registry());

    let (reply_tx, mut reply_rx) = mpsc::channel::<SessionReply>(64);
    let (handle, _worker) = spawn_session(session, llm, reply_tx);

    let total = registry.insert(handle.id().clone(), addr).await;
    tracing::info!(peer = %addr, session = %handle.id(), total, "client connected");

    loop {
        tokio::select! {
            // Replies from the session worker → this client's WebSocket.
            Some(reply) = reply_rx.recv() => {
                let msg = match reply {
                    SessionReply::Response(message) => ServerMessage::Response { message },
                    SessionReply::Greeting(message) => ServerMessage::Greeting { message },
                };
                if send(&mut sink, &msg).await.is_err() {
                    tracing::debug!(peer = %addr, "send failed, connection gone");
                    break;
                }
            }

            // Frames from this client's WebSocket → decode and dispatch.
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        dispatch_text(&text, &handle, &mut sink, &tokens, addr).await;
                    }
                    // Room data channels deliver raw byte payloads; decode
                    // UTF-8 text before handing to the orchestrator.
                    Some(Ok(Message::Binary(data))) => {
                        match String::from_utf8(data.to_vec()) {
                            Ok(text) => {
                                dispatch_text(&text, &handle, &mut sink, &tokens, addr).await;
                            }
                            Err(e) => {
                                tracing::warn!(peer = %addr, error = %e, "non-UTF-8 data frame");
                                let _ = send(&mut sink, &ServerMessage::Error {
                                    message: TURN_FAILED_REPLY.to_string(),
                                }).await;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(peer = %addr, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    let total = registry.remove(handle.id()).await;
    tracing::info!(peer = %addr, session = %handle.id(), total, "client disconnected");
    // Dropping `handle` closes the inbound queue; the in-flight turn (if
    // any) runs to completion and its publish is discarded.
}

/// Decode one text frame and route it: user turns and greetings go through
/// the session queue, token requests are answered directly.
async fn dispatch_text(
    text: &str,
    handle: &SessionHandle,
    sink: &mut WsSink,
    tokens: &Option<TokenConfig>,
    addr: SocketAddr,
) {
    let parsed = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!(peer = %addr, error = %e, "malformed client message");
            let _ = send(
                sink,
                &ServerMessage::Error {
                    message: TURN_FAILED_REPLY.to_string(),
                },
            )
            .await;
            return;
        }
    };

    match parsed {
        ClientMessage::UserInput { text } => {
            if !handle.submit(InboundEvent::UserInput(text)).await {
                tracing::warn!(peer = %addr, "session worker gone, dropping user input");
            }
        }
        ClientMessage::Activate => {
            if !handle.submit(InboundEvent::Activate).await {
                tracing::warn!(peer = %addr, "session worker gone, dropping activate");
            }
        }
        ClientMessage::GetToken { identity, room } => {
            let reply = match tokens {
                Some(config) => {
                    let identity = identity.as_deref().unwrap_or("browser-user");
                    let room = room.as_deref().unwrap_or(&config.default_room);
                    tracing::info!(peer = %addr, identity, room, "issuing room token");
                    ServerMessage::Token {
                        token: config.mint(identity, room),
                        url: config.url.clone(),
                        room: room.to_string(),
                    }
                }
                None => ServerMessage::Error {
                    message: "Room credentials are not configured.".to_string(),
                },
            };
            let _ = send(sink, &reply).await;
        }
    }
}

/// Send a ServerMessage as a JSON text frame.
async fn send(
    sink: &mut WsSink,
    response: &ServerMessage,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let json = serde_json::to_string(response).unwrap();
    sink.send(Message::Text(json.into())).await
}
