//! Registration and redemption of connection access tokens.

use std::sync::Arc;

use webssh_broker_core::{
    BrokerConfig, BrokerError, Clock, ConnectionRecord, ConnectionStore, Credential,
    NewConnection, PortField, RawOverrides, RegistrationRequest, SessionConfig, SystemClock,
};

/// Orchestrates a connection store and the static configuration.
#[derive(Clone)]
pub struct AuthorizationService {
    store: Arc<dyn ConnectionStore>,
    config: Arc<BrokerConfig>,
    clock: Arc<dyn Clock>,
}

impl AuthorizationService {
    /// Create a service reading time from the system clock.
    #[must_use]
    pub fn new(store: Arc<dyn ConnectionStore>, config: Arc<BrokerConfig>) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(
        store: Arc<dyn ConnectionStore>,
        config: Arc<BrokerConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn ConnectionStore> {
        &self.store
    }

    /// Register connection credentials and issue an access token.
    ///
    /// Only presence is checked here; the credentials themselves are trusted
    /// until the bridge uses them.
    ///
    /// # Errors
    /// Returns `BrokerError::Validation` naming the first missing field, or a
    /// store error.
    pub fn register(&self, req: RegistrationRequest) -> Result<ConnectionRecord, BrokerError> {
        let conn = checked_connection(req)?;
        let (address, username) = (conn.address.clone(), conn.username.clone());

        let record = self.store.upsert(conn, self.clock.now_ms())?;
        tracing::info!(%address, %username, expires_at = record.expires_at, "Registered connection");

        Ok(record)
    }

    /// Redeem an access token for a validated session configuration.
    ///
    /// The record is removed before expiry is checked, so a token is spent by
    /// its first redemption attempt whatever the outcome.
    ///
    /// # Errors
    /// Returns `BrokerError::NotFound` for unknown or spent tokens,
    /// `BrokerError::Expired` for tokens past their TTL, or a store error.
    pub fn redeem(
        &self,
        access_token: &str,
        overrides: &RawOverrides,
    ) -> Result<SessionConfig, BrokerError> {
        let record = self
            .store
            .take_by_access_token(access_token)?
            .ok_or(BrokerError::NotFound)?;

        if record.is_expired(self.clock.now_ms()) {
            tracing::warn!(address = %record.address, username = %record.username, "Expired access token redeemed");
            return Err(BrokerError::Expired);
        }

        tracing::info!(address = %record.address, username = %record.username, "Redeemed access token");
        Ok(SessionConfig::build(record, overrides, &self.config))
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, BrokerError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(BrokerError::Validation(field))
}

fn checked_connection(req: RegistrationRequest) -> Result<NewConnection, BrokerError> {
    let address = required(req.address, "address")?;
    let port = req
        .port
        .as_ref()
        .and_then(PortField::to_port)
        .ok_or(BrokerError::Validation("port"))?;
    let username = required(req.username, "username")?;
    let passphrase = req.passphrase.filter(|p| !p.is_empty());
    let credential = match (req.private_key.filter(|k| !k.is_empty()), passphrase) {
        (Some(key), passphrase) => Credential::PrivateKey { key, passphrase },
        (None, Some(passphrase)) => Credential::Passphrase { passphrase },
        (None, None) => return Err(BrokerError::Validation("privateKey")),
    };
    let token = required(req.token, "token")?;

    Ok(NewConnection {
        address,
        port,
        username,
        credential,
        token,
    })
}
