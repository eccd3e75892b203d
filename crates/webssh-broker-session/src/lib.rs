//! Registration storage and token redemption.
//!
//! Provides:
//! - `AuthorizationService` - Register connections and redeem access tokens
//! - `spawn_sweeper` - Optional background purge of expired registrations
//! - Storage implementations (memory)

pub mod service;
pub mod storage;
pub mod sweeper;

pub use service::AuthorizationService;
pub use sweeper::spawn_sweeper;
