//! WebSSH connection broker.
//!
//! Run with: `cargo run -p webssh-broker-server -- [config.json]`
//!
//! The config path is taken from the first argument, then
//! `WEBSSH_BROKER_CONFIG`, then `./config.json`.

use std::{io::ErrorKind, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webssh_broker_core::{BrokerConfig, SystemClock, config::ConfigError};
use webssh_broker_session::{
    AuthorizationService, spawn_sweeper, storage::MemoryConnectionStore,
};
use webssh_broker_transport::{AppState, SessionStore, create_router};

const CONFIG_ENV: &str = "WEBSSH_BROKER_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config_path = config_path(std::env::args().nth(1), std::env::var(CONFIG_ENV).ok());
    tracing::info!("Reading config from {}", config_path.display());
    let config = Arc::new(load_config(&config_path)?);

    let store = Arc::new(MemoryConnectionStore::new(config.connection_ttl()));
    let service = AuthorizationService::new(store.clone(), Arc::clone(&config));

    let sweeper = spawn_sweeper(
        store,
        Arc::new(SystemClock),
        Duration::from_secs(config.connections.sweep_interval),
    );
    if sweeper.is_some() {
        tracing::info!(
            every_secs = config.connections.sweep_interval,
            "Expired registration sweeper started"
        );
    }

    let sessions = SessionStore::with_ttl(config.handoff_ttl());
    let state = AppState::new(service, Arc::new(sessions))
        .context("Failed to set up HTTP state")?;
    let app = create_router(state);

    // Start server
    let addr = config.listen.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    Ok(())
}

fn config_path(arg: Option<String>, env: Option<String>) -> PathBuf {
    arg.or(env)
        .map_or_else(|| PathBuf::from("config.json"), PathBuf::from)
}

/// Load the config file, falling back to defaults when it does not exist.
fn load_config(path: &std::path::Path) -> Result<BrokerConfig> {
    match BrokerConfig::from_file(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::Read { source, .. }) if source.kind() == ErrorKind::NotFound => {
            tracing::warn!("{} not found, using default config", path.display());
            Ok(BrokerConfig::default())
        }
        Err(e) => Err(e).context("Failed to load config"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    #[test]
    fn test_config_path_precedence() {
        assert_eq!(
            config_path(Some("a.json".into()), Some("b.json".into())),
            PathBuf::from("a.json")
        );
        assert_eq!(config_path(None, Some("b.json".into())), PathBuf::from("b.json"));
        assert_eq!(config_path(None, None), PathBuf::from("config.json"));
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let config = assert_ok!(load_config(std::path::Path::new(
            "/nonexistent/webssh-broker/config.json"
        )));
        assert_eq!(config.listen.port, 2222);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let path = std::env::temp_dir().join(format!(
            "webssh-broker-invalid-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{ not json").unwrap();
        let result = load_config(&path);
        std::fs::remove_file(&path).unwrap();
        assert_err!(result);
    }
}
