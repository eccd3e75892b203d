//! Static broker configuration.
//!
//! Loaded once from `config.json` and shared read-only afterwards. Every
//! section falls back to the stock WebSSH2 defaults, so a partial file (or
//! `{}`) is a valid configuration.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration load error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Process-wide static configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrokerConfig {
    pub listen: ListenConfig,
    pub session: CookieSessionConfig,
    pub header: HeaderConfig,
    pub ssh: SshConfig,
    pub terminal: TerminalConfig,
    pub algorithms: AlgorithmsConfig,
    pub serverlog: ServerLogConfig,
    /// Wrap the router in a request-logging layer.
    pub accesslog: bool,
    pub connections: ConnectionsConfig,
    /// Directory holding the terminal front-end (`client.htm` and assets).
    pub public_path: Option<PathBuf>,
}

impl BrokerConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    /// Returns error if the text is not valid JSON for this schema.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Lifetime of an unredeemed registration.
    #[must_use]
    pub const fn connection_ttl(&self) -> Duration {
        Duration::from_secs(self.connections.expires)
    }

    /// Lifetime of a handed-off session nobody has claimed.
    #[must_use]
    pub const fn handoff_ttl(&self) -> Duration {
        Duration::from_secs(self.connections.handoff_expires)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListenConfig {
    pub ip: IpAddr,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 2222,
        }
    }
}

impl ListenConfig {
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

/// Browser session cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CookieSessionConfig {
    /// Cookie name.
    pub name: String,
    /// HMAC key used to sign the cookie value.
    pub secret: String,
}

impl Default for CookieSessionConfig {
    fn default() -> Self {
        Self {
            name: "WebSSH2".to_string(),
            secret: "mysecret".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderConfig {
    pub text: Option<String>,
    pub background: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            text: None,
            background: "green".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SshConfig {
    pub term: String,
    /// Milliseconds to wait for the SSH handshake.
    pub ready_timeout: u64,
    /// Milliseconds between keepalive packets.
    pub keepalive_interval: u64,
    pub keepalive_count_max: u32,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            term: "xterm-color".to_string(),
            ready_timeout: 20_000,
            keepalive_interval: 120_000,
            keepalive_count_max: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerminalConfig {
    pub cursor_blink: bool,
    pub scrollback: u32,
    pub tab_stop_width: u32,
    pub bell_style: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            cursor_blink: true,
            scrollback: 10_000,
            tab_stop_width: 8,
            bell_style: "sound".to_string(),
        }
    }
}

/// SSH algorithm preferences, passed through to the bridge untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlgorithmsConfig {
    pub kex: Vec<String>,
    pub cipher: Vec<String>,
    pub hmac: Vec<String>,
    pub compress: Vec<String>,
}

impl Default for AlgorithmsConfig {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| (*s).to_string()).collect()
        }

        Self {
            kex: owned(&[
                "ecdh-sha2-nistp256",
                "ecdh-sha2-nistp384",
                "ecdh-sha2-nistp521",
                "diffie-hellman-group-exchange-sha256",
                "diffie-hellman-group14-sha1",
            ]),
            cipher: owned(&[
                "aes128-ctr",
                "aes192-ctr",
                "aes256-ctr",
                "aes128-gcm",
                "aes128-gcm@openssh.com",
                "aes256-gcm",
                "aes256-gcm@openssh.com",
                "aes256-cbc",
            ]),
            hmac: owned(&["hmac-sha2-256", "hmac-sha2-512", "hmac-sha1"]),
            compress: owned(&["none", "zlib@openssh.com", "zlib"]),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerLogConfig {
    pub client: bool,
    pub server: bool,
}

/// Registration lifetime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionsConfig {
    /// Seconds an access token stays redeemable.
    pub expires: u64,
    /// Seconds between sweeps of expired registrations. `0` disables sweeping.
    pub sweep_interval: u64,
    /// Seconds a redeemed session waits for the terminal bridge to claim it.
    pub handoff_expires: u64,
}

impl Default for ConnectionsConfig {
    fn default() -> Self {
        Self {
            expires: 300,
            sweep_interval: 0,
            handoff_expires: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = assert_ok!(BrokerConfig::from_json_str("{}"));
        assert_eq!(config.listen.port, 2222);
        assert_eq!(config.session.name, "WebSSH2");
        assert_eq!(config.ssh.term, "xterm-color");
        assert_eq!(config.ssh.ready_timeout, 20_000);
        assert_eq!(config.terminal.scrollback, 10_000);
        assert_eq!(config.terminal.bell_style, "sound");
        assert_eq!(config.connection_ttl(), Duration::from_secs(300));
        assert_eq!(config.handoff_ttl(), Duration::from_secs(60));
        assert!(!config.accesslog);
        assert!(config.public_path.is_none());
        assert!(config.algorithms.hmac.contains(&"hmac-sha1".to_string()));
    }

    #[test]
    fn test_partial_sections_keep_remaining_defaults() {
        let json = r#"{
            "listen": { "ip": "127.0.0.1", "port": 8080 },
            "header": { "text": "Prod", "background": "red" },
            "terminal": { "scrollback": 500 },
            "serverlog": { "client": true },
            "connections": { "expires": 30, "sweepInterval": 60 },
            "accesslog": true
        }"#;
        let config = assert_ok!(BrokerConfig::from_json_str(json));

        assert_eq!(config.listen.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.header.text.as_deref(), Some("Prod"));
        assert_eq!(config.header.background, "red");
        assert_eq!(config.terminal.scrollback, 500);
        assert_eq!(config.terminal.tab_stop_width, 8);
        assert!(config.terminal.cursor_blink);
        assert!(config.serverlog.client);
        assert!(!config.serverlog.server);
        assert_eq!(config.connections.expires, 30);
        assert_eq!(config.connections.sweep_interval, 60);
        assert!(config.accesslog);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = assert_err!(BrokerConfig::from_json_str("{ listen: "));
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = BrokerConfig::from_file("/nonexistent/webssh/config.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/webssh/config.json"));
    }
}
