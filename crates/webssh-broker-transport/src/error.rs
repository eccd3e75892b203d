//! HTTP error mapping.

use std::{io, path::PathBuf};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use webssh_broker_core::BrokerError;

use crate::cookie::CookieError;

const NOT_FOUND_BODY: &str = "Sorry can't find that!";
const BAD_REQUEST_BODY: &str = "Bad request";
const INTERNAL_BODY: &str = "Something broke!";

/// Error building the HTTP state at startup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Cookie(#[from] CookieError),
    #[error("Failed to read client page {}", path.display())]
    ClientPage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Error returned by HTTP handlers.
///
/// Bodies are fixed strings; details only go to the log. Unknown and expired
/// access tokens render identically.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Broker(#[from] BrokerError),
    #[error("Unreadable request body: {0}")]
    BadRequest(String),
    #[error("No such route")]
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Broker(BrokerError::Validation(field)) => {
                tracing::debug!(field, "Rejected registration");
                (StatusCode::BAD_REQUEST, BAD_REQUEST_BODY)
            }
            Self::BadRequest(reason) => {
                tracing::debug!(%reason, "Rejected request body");
                (StatusCode::BAD_REQUEST, BAD_REQUEST_BODY)
            }
            Self::Broker(BrokerError::NotFound | BrokerError::Expired) | Self::NotFound => {
                (StatusCode::NOT_FOUND, NOT_FOUND_BODY)
            }
            Self::Broker(BrokerError::Store(_) | BrokerError::Handoff(_)) => {
                tracing::error!("{self}");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_BODY)
            }
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use webssh_broker_core::StoreError;

    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(BrokerError::Validation("address")), StatusCode::BAD_REQUEST),
            (ApiError::BadRequest("eof".to_string()), StatusCode::BAD_REQUEST),
            (ApiError::from(BrokerError::NotFound), StatusCode::NOT_FOUND),
            (ApiError::from(BrokerError::Expired), StatusCode::NOT_FOUND),
            (ApiError::NotFound, StatusCode::NOT_FOUND),
            (
                ApiError::from(BrokerError::Store(StoreError::Internal("poisoned".to_string()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
