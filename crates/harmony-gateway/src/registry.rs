//! Process-wide registry of live sessions, keyed by session id.
//!
//! One entry per transport connection, inserted on connect and removed on
//! disconnect. Purely observational: the connection task owns its session;
//! the registry exists so operators can see what is live.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use harmony_agent::SessionId;

#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub peer: SocketAddr,
    pub connected_at: Instant,
}

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, SessionInfo>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live sessions after the insert.
    pub async fn insert(&self, id: SessionId, peer: SocketAddr) -> usize {
        let mut map = self.sessions.write().await;
        map.insert(
            id,
            SessionInfo {
                peer,
                connected_at: Instant::now(),
            },
        );
        map.len()
    }

    /// Returns the number of live sessions after the removal.
    pub async fn remove(&self, id: &SessionId) -> usize {
        let mut map = self.sessions.write().await;
        if let Some(info) = map.remove(id) {
            tracing::debug!(
                session = %id,
                peer = %info.peer,
                uptime_secs = info.connected_at.elapsed().as_secs(),
                "session unregistered"
            );
        }
        map.len()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:9999".parse().unwrap()
    }

    #[tokio::test]
    async fn insert_and_remove_track_count() {
        let registry = SessionRegistry::new();
        let a = SessionId::new();
        let b = SessionId::new();

        assert_eq!(registry.insert(a.clone(), addr()).await, 1);
        assert_eq!(registry.insert(b.clone(), addr()).await, 2);
        assert_eq!(registry.count().await, 2);

        assert_eq!(registry.remove(&a).await, 1);
        assert_eq!(registry.remove(&b).await, 0);
    }

    #[tokio::test]
    async fn removing_unknown_id_is_harmless() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.remove(&SessionId::new()).await, 0);
    }
}
