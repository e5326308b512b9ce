//! harmony-gateway: WebSocket gateway for the Harmony assistant.
//!
//! Accepts WebSocket connections from the browser extension, owns one
//! conversation session per connection, and bridges user turns to the LLM
//! backend. Sessions are fully independent; a slow turn in one never
//! blocks another.

mod connection;
mod protocol;
mod registry;
mod token;

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;

use harmony_agent::{LlmClient, LlmConfig, OpenRouterClient};

use crate::connection::handle_connection;
use crate::registry::SessionRegistry;
use crate::token::TokenConfig;

#[derive(Parser)]
#[command(name = "harmony-gateway", about = "WebSocket gateway for the Harmony assistant")]
struct Args {
    /// Port to listen on.
    #[arg(short, long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "harmony_gateway=info,harmony_agent=info".into()),
        )
        .init();

    let args = Args::parse();

    let llm: Arc<dyn LlmClient> = match LlmConfig::from_env() {
        Ok(config) => {
            tracing::info!(model = %config.model, "LLM backend configured");
            Arc::new(OpenRouterClient::new(config))
        }
        Err(e) => {
            tracing::error!(error = %e, "cannot start without an LLM backend");
            std::process::exit(1);
        }
    };

    let tokens = match TokenConfig::from_env() {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(error = %e, "room token requests will be rejected");
            None
        }
    };

    let registry = SessionRegistry::new();

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind TCP listener");

    tracing::info!("harmony-gateway listening on {}", addr);

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let registry = registry.clone();
                let llm = llm.clone();
                let tokens = tokens.clone();
                tokio::spawn(async move {
                    match accept_async(stream).await {
                        Ok(ws) => handle_connection(ws, peer, registry, llm, tokens).await,
                        Err(e) => {
                            tracing::warn!(peer = %peer, error = %e, "WS handshake failed");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}
