//! In-process session handoff.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;
use webssh_broker_core::{HandoffError, HandoffId, SessionConfig, SessionHandoff};

const DEFAULT_TTL: Duration = Duration::from_secs(60);

struct PendingSession {
    config: SessionConfig,
    handed_off_at: Instant,
}

/// Redeemed session configurations awaiting the terminal bridge.
///
/// The bridge looks a configuration up by the id carried in the browser's
/// session cookie and should `take` it once the SSH connection starts.
/// Entries nobody claims within the TTL are dropped, since they hold
/// credentials.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<HandoffId, PendingSession>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    fn is_live(&self, session: &PendingSession) -> bool {
        session.handed_off_at.elapsed() <= self.ttl
    }

    /// Get a session without consuming it.
    pub async fn get(&self, id: HandoffId) -> Option<SessionConfig> {
        self.sessions
            .read()
            .await
            .get(&id)
            .filter(|s| self.is_live(s))
            .map(|s| s.config.clone())
    }

    /// Remove and return a session.
    pub async fn take(&self, id: HandoffId) -> Option<SessionConfig> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .filter(|s| self.is_live(s))
            .map(|s| s.config)
    }

    /// Drop sessions past their TTL, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| self.is_live(s));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionHandoff for SessionStore {
    async fn hand_off(&self, config: SessionConfig) -> Result<HandoffId, HandoffError> {
        let id = Uuid::new_v4();
        tracing::debug!(%id, host = %config.host, "Session handed off");

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| self.is_live(s));
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::debug!(purged, "Dropped unclaimed sessions");
        }
        sessions.insert(
            id,
            PendingSession {
                config,
                handed_off_at: Instant::now(),
            },
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::assert_ok;
    use webssh_broker_core::{
        BrokerConfig, ConnectionRecord, Credential, NewConnection, RawOverrides,
    };

    use super::*;

    fn session_config() -> SessionConfig {
        let record = ConnectionRecord::issue(
            NewConnection {
                address: "h".to_string(),
                port: 22,
                username: "u".to_string(),
                credential: Credential::Passphrase {
                    passphrase: "p".to_string(),
                },
                token: "r1".to_string(),
            },
            "a".to_string(),
            0,
        );
        SessionConfig::build(record, &RawOverrides::default(), &BrokerConfig::default())
    }

    #[tokio::test]
    async fn test_hand_off_then_take() {
        let store = SessionStore::new();
        let id = assert_ok!(store.hand_off(session_config()).await);

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(id).await.map(|c| c.host), Some("h".to_string()));
        assert!(store.take(id).await.is_some());
        assert!(store.take(id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_each_handoff_gets_distinct_id() {
        let store = SessionStore::new();
        let a = assert_ok!(store.hand_off(session_config()).await);
        let b = assert_ok!(store.hand_off(session_config()).await);
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_unclaimed_session_expires() {
        let store = SessionStore::with_ttl(Duration::from_millis(10));
        let id = assert_ok!(store.hand_off(session_config()).await);
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(store.get(id).await.is_none());
        assert_eq!(store.purge_expired().await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_hand_off_drops_stale_entries() {
        let store = SessionStore::with_ttl(Duration::from_millis(10));
        let stale = assert_ok!(store.hand_off(session_config()).await);
        tokio::time::sleep(Duration::from_millis(30)).await;

        let fresh = assert_ok!(store.hand_off(session_config()).await);
        assert_eq!(store.len().await, 1);
        assert!(store.take(stale).await.is_none());
        assert!(store.take(fresh).await.is_some());
    }
}
