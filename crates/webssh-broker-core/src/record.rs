//! Pending connection registrations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Secret used to authenticate against the remote host.
///
/// Serializes flat (`privateKey` / `passphrase`) so a record echoes back the
/// same field names the client registered with.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Credential {
    /// PEM private key, optionally encrypted with `passphrase`.
    PrivateKey {
        #[serde(rename = "privateKey")]
        key: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        passphrase: Option<String>,
    },
    /// Password login.
    Passphrase { passphrase: String },
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrivateKey { passphrase, .. } => f
                .debug_struct("PrivateKey")
                .field("key", &"<redacted>")
                .field("passphrase", &passphrase.as_ref().map(|_| "<redacted>"))
                .finish(),
            Self::Passphrase { .. } => f
                .debug_struct("Passphrase")
                .field("passphrase", &"<redacted>")
                .finish(),
        }
    }
}

/// Port as sent by the client: JSON number or form/JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortField {
    Number(u64),
    Text(String),
}

impl PortField {
    /// Interpret as a TCP port; `None` for zero, out of range or non-numeric.
    #[must_use]
    pub fn to_port(&self) -> Option<u16> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse().ok()?,
        };
        u16::try_from(value).ok().filter(|port| *port != 0)
    }
}

/// Registration body, exactly as received.
///
/// Every field is optional here; `AuthorizationService::register` decides
/// what is missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub address: Option<String>,
    pub port: Option<PortField>,
    pub username: Option<String>,
    pub private_key: Option<String>,
    pub passphrase: Option<String>,
    pub token: Option<String>,
}

/// Checked registration fields handed to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConnection {
    pub address: String,
    pub port: u16,
    pub username: String,
    pub credential: Credential,
    pub token: String,
}

/// A pending, not-yet-redeemed connection request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub address: String,
    pub port: u16,
    pub username: String,
    #[serde(flatten)]
    pub credential: Credential,
    /// Caller-supplied registration token.
    pub token: String,
    /// Single-use redemption token.
    pub access_token: String,
    /// Expiry as Unix epoch milliseconds.
    pub expires_at: i64,
}

impl ConnectionRecord {
    /// Build a record from checked fields and freshly issued token/expiry.
    #[must_use]
    pub fn issue(conn: NewConnection, access_token: String, expires_at: i64) -> Self {
        Self {
            address: conn.address,
            port: conn.port,
            username: conn.username,
            credential: conn.credential,
            token: conn.token,
            access_token,
            expires_at,
        }
    }

    /// Whether the record is past its expiry at `now_ms`.
    #[must_use]
    pub const fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at
    }
}
