//! Signed session cookie.
//!
//! The cookie value is `<handoff id>.<hex HMAC-SHA256 of the id>`, keyed with
//! the configured session secret.

use axum::http::{HeaderMap, header::COOKIE};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use webssh_broker_core::{HandoffId, config::CookieSessionConfig};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum CookieError {
    #[error("Invalid session secret")]
    InvalidSecret,
}

/// Issues and checks session cookies.
#[derive(Clone)]
pub struct CookieSigner {
    name: String,
    mac: HmacSha256,
}

impl CookieSigner {
    /// # Errors
    /// Returns error if the secret cannot key an HMAC.
    pub fn new(name: impl Into<String>, secret: &str) -> Result<Self, CookieError> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| CookieError::InvalidSecret)?;
        Ok(Self {
            name: name.into(),
            mac,
        })
    }

    /// # Errors
    /// Returns error if the configured secret cannot key an HMAC.
    pub fn from_config(config: &CookieSessionConfig) -> Result<Self, CookieError> {
        Self::new(config.name.clone(), &config.secret)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signed cookie value for `id`.
    #[must_use]
    pub fn sign(&self, id: HandoffId) -> String {
        let id = id.to_string();
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        format!("{id}.{}", hex::encode(mac.finalize().into_bytes()))
    }

    /// Recover the id from a signed value, rejecting forged or malformed ones.
    #[must_use]
    pub fn verify(&self, value: &str) -> Option<HandoffId> {
        let (id, signature) = value.split_once('.')?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.verify_slice(&signature).ok()?;

        HandoffId::parse_str(id).ok()
    }

    /// `Set-Cookie` header value for a fresh handoff.
    #[must_use]
    pub fn set_cookie(&self, id: HandoffId) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            self.name,
            self.sign(id)
        )
    }

    /// Find and verify this cookie among the request's `Cookie` headers.
    #[must_use]
    pub fn handoff_id(&self, headers: &HeaderMap) -> Option<HandoffId> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == self.name)
            .find_map(|(_, value)| self.verify(value))
    }
}
