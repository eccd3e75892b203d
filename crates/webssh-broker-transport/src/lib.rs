//! HTTP transport for the connection broker.
//!
//! Provides:
//! - `create_router` - `POST /authentication` and `GET /connect/{accessToken}`
//! - `SessionStore` - In-process `SessionHandoff` the terminal bridge reads from
//! - `CookieSigner` - Signed session cookie carrying the handoff id

pub mod client;
pub mod cookie;
pub mod error;
pub mod handoff;
pub mod http;

pub use cookie::{CookieError, CookieSigner};
pub use error::{ApiError, SetupError};
pub use handoff::SessionStore;
pub use http::{AppState, create_router};
