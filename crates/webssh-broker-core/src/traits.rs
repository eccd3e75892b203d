//! Core traits for registration storage, session handoff and time.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::{ConnectionRecord, NewConnection, SessionConfig};

/// Identifier under which a redeemed session was handed off.
pub type HandoffId = Uuid;

/// Storage error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store error: {0}")]
    Internal(String),
}

/// Trait for pending-connection registries.
///
/// Implementations must make `take_by_access_token` linearizable with
/// `upsert`: of any number of concurrent takes for one token, at most one
/// returns the record.
pub trait ConnectionStore: Send + Sync {
    /// Insert, or replace the record registered under `(address, token)`.
    ///
    /// A fresh access token is issued either way and the previous one stops
    /// resolving immediately. `expires_at` is `now_ms` plus the store TTL.
    fn upsert(&self, conn: NewConnection, now_ms: i64) -> Result<ConnectionRecord, StoreError>;

    /// Find and remove the record holding `access_token` in one step.
    fn take_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<ConnectionRecord>, StoreError>;

    /// Drop every record past its expiry, returning how many were removed.
    fn purge_expired(&self, now_ms: i64) -> Result<usize, StoreError>;

    /// Number of live records.
    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Handoff error.
#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("Handoff rejected: {0}")]
    Rejected(String),
    #[error("Handoff error: {0}")]
    Internal(String),
}

/// Receiver of validated session configurations.
///
/// Implement this to connect the broker to a terminal bridge. The returned
/// id is what the browser presents back when it opens the terminal.
#[async_trait]
pub trait SessionHandoff: Send + Sync {
    async fn hand_off(&self, config: SessionConfig) -> Result<HandoffId, HandoffError>;
}

/// Wall-clock source, in Unix epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// System time clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_past_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
