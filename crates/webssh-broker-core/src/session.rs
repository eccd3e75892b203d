//! Validated session configuration produced by redemption.

use serde::Serialize;

use crate::{
    config::{AlgorithmsConfig, BrokerConfig, ServerLogConfig},
    record::{ConnectionRecord, Credential},
    validate,
};

/// Bell styles the terminal front-end understands.
pub const BELL_STYLES: &[&str] = &["sound", "none"];

pub const SCROLLBACK_RANGE: (i64, i64) = (1, 200_000);
pub const TAB_STOP_RANGE: (i64, i64) = (1, 100);
pub const READY_TIMEOUT_RANGE: (i64, i64) = (1, 300_000);

/// Client-supplied overrides, unvalidated.
///
/// Query parameters and the two recognized headers. Values only reach a
/// `SessionConfig` through the `validate` functions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOverrides {
    pub header: Option<String>,
    pub header_background: Option<String>,
    pub sshterm: Option<String>,
    pub cursor_blink: Option<String>,
    pub scrollback: Option<String>,
    pub tab_stop_width: Option<String>,
    pub bell_style: Option<String>,
    pub ready_timeout: Option<String>,
    /// `allowreplay` request header.
    pub allow_replay: Option<String>,
    /// `mrhsession` request header.
    pub mrh_session: Option<String>,
}

impl RawOverrides {
    /// Collect query overrides from decoded `key=value` pairs.
    ///
    /// The first occurrence of a key wins; unknown keys are ignored.
    #[must_use]
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut overrides = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "header" => &mut overrides.header,
                "headerBackground" => &mut overrides.header_background,
                "sshterm" => &mut overrides.sshterm,
                "cursorBlink" => &mut overrides.cursor_blink,
                "scrollback" => &mut overrides.scrollback,
                "tabStopWidth" => &mut overrides.tab_stop_width,
                "bellStyle" => &mut overrides.bell_style,
                "readyTimeout" => &mut overrides.ready_timeout,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        overrides
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderSettings {
    pub name: String,
    pub background: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalSettings {
    pub cursor_blink: bool,
    pub scrollback: u32,
    pub tab_stop_width: u32,
    pub bell_style: String,
}

/// Everything the terminal bridge needs to open one remote session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(flatten)]
    pub credential: Credential,
    pub header: HeaderSettings,
    pub term: String,
    pub terminal: TerminalSettings,
    #[serde(rename = "allowreplay")]
    pub allow_replay: bool,
    #[serde(rename = "mrhsession")]
    pub mrh_session: String,
    #[serde(rename = "serverlog")]
    pub server_log: ServerLogConfig,
    /// Milliseconds.
    pub ready_timeout: u64,
    /// Milliseconds.
    pub keepalive_interval: u64,
    pub keepalive_count_max: u32,
    pub algorithms: AlgorithmsConfig,
}

impl SessionConfig {
    /// Combine a redeemed record with validated overrides and static defaults.
    #[must_use]
    pub fn build(record: ConnectionRecord, overrides: &RawOverrides, config: &BrokerConfig) -> Self {
        let terminal = &config.terminal;
        let ssh = &config.ssh;

        Self {
            host: record.address,
            port: record.port,
            username: record.username,
            credential: record.credential,
            header: HeaderSettings {
                name: validate::text_or_default(
                    overrides.header.as_deref(),
                    config.header.text.as_deref().unwrap_or_default(),
                ),
                background: validate::text_or_default(
                    overrides.header_background.as_deref(),
                    &config.header.background,
                ),
            },
            term: validate::term_name_or_default(overrides.sshterm.as_deref(), &ssh.term),
            terminal: TerminalSettings {
                cursor_blink: validate::bool_or_default(
                    overrides.cursor_blink.as_deref(),
                    terminal.cursor_blink,
                ),
                scrollback: bounded_u32(
                    overrides.scrollback.as_deref(),
                    SCROLLBACK_RANGE,
                    terminal.scrollback,
                ),
                tab_stop_width: bounded_u32(
                    overrides.tab_stop_width.as_deref(),
                    TAB_STOP_RANGE,
                    terminal.tab_stop_width,
                ),
                bell_style: validate::enum_or_default(
                    overrides.bell_style.as_deref(),
                    BELL_STYLES,
                    &terminal.bell_style,
                ),
            },
            allow_replay: validate::bool_or_default(overrides.allow_replay.as_deref(), false),
            mrh_session: validate::alnum_or_default(overrides.mrh_session.as_deref(), "none"),
            server_log: config.serverlog,
            ready_timeout: bounded_u64(
                overrides.ready_timeout.as_deref(),
                READY_TIMEOUT_RANGE,
                ssh.ready_timeout,
            ),
            keepalive_interval: ssh.keepalive_interval,
            keepalive_count_max: ssh.keepalive_count_max,
            algorithms: config.algorithms.clone(),
        }
    }
}

// Ranges are positive, so an accepted override always converts; the
// configured default is used untouched when the override is rejected.
fn bounded_u32(raw: Option<&str>, (min, max): (i64, i64), default: u32) -> u32 {
    let value = validate::int_in_range_or_default(raw, min, max, i64::from(default));
    u32::try_from(value).unwrap_or(default)
}

fn bounded_u64(raw: Option<&str>, (min, max): (i64, i64), default: u64) -> u64 {
    let fallback = i64::try_from(default).unwrap_or(i64::MAX);
    let value = validate::int_in_range_or_default(raw, min, max, fallback);
    u64::try_from(value).unwrap_or(default)
}
