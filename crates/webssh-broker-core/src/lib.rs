//! Core abstractions for the WebSSH connection broker.
//!
//! This crate provides the fundamental building blocks:
//! - `BrokerConfig` - Static defaults read once at startup
//! - `ConnectionRecord` / `SessionConfig` - Pending registrations and their validated output
//! - `validate` - Total sanitizers for untrusted client input
//! - Store, handoff and clock traits

pub mod config;
pub mod error;
pub mod record;
pub mod session;
pub mod traits;
pub mod validate;

pub use config::BrokerConfig;
pub use error::BrokerError;
pub use record::{ConnectionRecord, Credential, NewConnection, PortField, RegistrationRequest};
pub use session::{RawOverrides, SessionConfig};
pub use traits::{
    Clock, ConnectionStore, HandoffError, HandoffId, SessionHandoff, StoreError, SystemClock,
};
