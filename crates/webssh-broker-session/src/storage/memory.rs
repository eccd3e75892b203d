//! In-memory registration store.

use std::{collections::HashMap, sync::Mutex, time::Duration};

use uuid::Uuid;
use webssh_broker_core::{ConnectionRecord, ConnectionStore, NewConnection, StoreError};

/// `(address, registration token)`.
type SlotKey = (String, String);

#[derive(Default)]
struct Inner {
    records: HashMap<SlotKey, ConnectionRecord>,
    /// access token -> slot
    by_access_token: HashMap<String, SlotKey>,
}

impl Inner {
    fn fresh_access_token(&self) -> String {
        loop {
            let candidate = Uuid::new_v4().to_string();
            if !self.by_access_token.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

/// In-memory store implementation.
///
/// Both maps sit behind a single mutex so every operation is one critical
/// section. Data is lost on restart.
pub struct MemoryConnectionStore {
    inner: Mutex<Inner>,
    ttl_ms: i64,
}

impl MemoryConnectionStore {
    /// Create a store whose records expire `ttl` after registration.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|e| StoreError::Internal(e.to_string()))
    }
}

impl ConnectionStore for MemoryConnectionStore {
    fn upsert(&self, conn: NewConnection, now_ms: i64) -> Result<ConnectionRecord, StoreError> {
        let mut inner = self.lock()?;

        let key = (conn.address.clone(), conn.token.clone());
        let access_token = inner.fresh_access_token();
        let record = ConnectionRecord::issue(
            conn,
            access_token.clone(),
            now_ms.saturating_add(self.ttl_ms),
        );

        if let Some(previous) = inner.records.insert(key.clone(), record.clone()) {
            inner.by_access_token.remove(&previous.access_token);
        }
        inner.by_access_token.insert(access_token, key);

        Ok(record)
    }

    fn take_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<ConnectionRecord>, StoreError> {
        let mut inner = self.lock()?;

        let Some(key) = inner.by_access_token.remove(access_token) else {
            return Ok(None);
        };
        Ok(inner.records.remove(&key))
    }

    fn purge_expired(&self, now_ms: i64) -> Result<usize, StoreError> {
        let mut inner = self.lock()?;

        let expired: Vec<SlotKey> = inner
            .records
            .iter()
            .filter(|(_, record)| record.is_expired(now_ms))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            if let Some(record) = inner.records.remove(key) {
                inner.by_access_token.remove(&record.access_token);
            }
        }

        Ok(expired.len())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.records.len())
    }
}
