//! Broker error type.

use thiserror::Error;

use crate::traits::{HandoffError, StoreError};

/// Errors surfaced by registration and redemption.
///
/// `Validation`, `NotFound` and `Expired` are terminal for the request and
/// never retried; the client has to register again.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// A required registration field is missing or malformed.
    #[error("Missing or invalid field: {0}")]
    Validation(&'static str),
    /// Unknown or already redeemed access token.
    #[error("Access token not found")]
    NotFound,
    /// Access token was known but past its expiry; it has been removed.
    #[error("Access token expired")]
    Expired,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Handoff(#[from] HandoffError),
}

impl BrokerError {
    /// Whether this error is the client's doing rather than the server's.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound | Self::Expired)
    }
}
