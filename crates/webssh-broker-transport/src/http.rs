//! Broker HTTP routes.

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{FromRequest, Path, Query, Request, State},
    handler::HandlerWithoutStateExt,
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use webssh_broker_core::{
    BrokerError, ConnectionRecord, RawOverrides, RegistrationRequest, SessionHandoff,
};
use webssh_broker_session::AuthorizationService;

use crate::{
    client::ClientPage,
    cookie::CookieSigner,
    error::{ApiError, SetupError},
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    service: AuthorizationService,
    handoff: Arc<dyn SessionHandoff>,
    cookie: CookieSigner,
    client_page: ClientPage,
}

impl AppState {
    /// # Errors
    /// Returns error if the configured session secret is unusable or the
    /// client page cannot be read.
    pub fn new(
        service: AuthorizationService,
        handoff: Arc<dyn SessionHandoff>,
    ) -> Result<Self, SetupError> {
        let config = service.config();
        let cookie = CookieSigner::from_config(&config.session)?;
        let client_page = ClientPage::load(config.public_path.as_deref())?;
        Ok(Self {
            service,
            handoff,
            cookie,
            client_page,
        })
    }
}

/// Build the broker router.
///
/// Unmatched paths are served from the public directory when one is
/// configured, otherwise they get the generic 404.
#[must_use]
pub fn create_router(state: AppState) -> Router {
    let config = state.service.config();
    let public_path = config.public_path.clone();
    let accesslog = config.accesslog;

    let router = Router::new()
        .route("/authentication", post(register_handler))
        .route("/connect/{access_token}", get(connect_handler));

    let router = match public_path {
        Some(dir) => router
            .fallback_service(ServeDir::new(dir).not_found_service(not_found.into_service())),
        None => router.fallback(not_found),
    };

    let router = router.with_state(state);
    if accesslog {
        router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
    } else {
        router
    }
}

/// Registration body, JSON or URL-encoded form.
pub struct RegistrationBody(pub RegistrationRequest);

impl<S> FromRequest<S> for RegistrationBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let body = if is_form {
            Form::<RegistrationRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?
                .0
        } else {
            Json::<RegistrationRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?
                .0
        };
        Ok(Self(body))
    }
}

async fn register_handler(
    State(state): State<AppState>,
    RegistrationBody(req): RegistrationBody,
) -> Result<Json<ConnectionRecord>, ApiError> {
    Ok(Json(state.service.register(req)?))
}

async fn connect_handler(
    State(state): State<AppState>,
    Path(access_token): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let mut overrides = RawOverrides::from_query_pairs(query);
    overrides.allow_replay = header_str(&headers, "allowreplay");
    overrides.mrh_session = header_str(&headers, "mrhsession");

    let session = state.service.redeem(&access_token, &overrides)?;
    let id = state
        .handoff
        .hand_off(session)
        .await
        .map_err(BrokerError::from)?;

    Ok((
        [(header::SET_COOKIE, state.cookie.set_cookie(id))],
        Html(state.client_page.html().to_owned()),
    )
        .into_response())
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
