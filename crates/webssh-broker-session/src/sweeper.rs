//! Periodic purge of expired registrations.
//!
//! Redemption already rejects expired tokens on its own; the sweeper only
//! bounds memory held by registrations nobody comes back for.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use webssh_broker_core::{Clock, ConnectionStore};

/// Spawn a task purging expired records every `every`.
///
/// Returns `None` when `every` is zero.
#[must_use]
pub fn spawn_sweeper(
    store: Arc<dyn ConnectionStore>,
    clock: Arc<dyn Clock>,
    every: Duration,
) -> Option<JoinHandle<()>> {
    if every.is_zero() {
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match store.purge_expired(clock.now_ms()) {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "Purged expired registrations"),
                Err(e) => tracing::error!("Registration sweep failed: {e}"),
            }
        }
    }))
}
