//! Client configuration parsed from environment variables.
//!
//! Front ends start from [`ClientConfig::from_env`] and override individual
//! fields from their own flags.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const WS_CHAT_PATH: &str = "/ws/chat";
pub const DEFAULT_HISTORY_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_BALANCE_REFRESH_MS: u64 = 1000;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const PREFERENCES_FILE: &str = "preferences.json";
const APP_DIR: &str = "chat-cli";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// HTTP base URL of the backend, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
    /// Raw `Cookie` header value sent with every request.
    pub session_cookie: Option<String>,
    /// JSON file holding persisted preferences (theme).
    pub preferences_path: PathBuf,
    /// Quiet period after the last scroll before a history page is requested.
    pub history_debounce: Duration,
    /// Delay between a top-up and the follow-up balance fetch.
    pub balance_refresh_delay: Duration,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Config for `base_url` with every other field at its default.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            session_cookie: None,
            preferences_path: PathBuf::from(PREFERENCES_FILE),
            history_debounce: Duration::from_millis(DEFAULT_HISTORY_DEBOUNCE_MS),
            balance_refresh_delay: Duration::from_millis(DEFAULT_BALANCE_REFRESH_MS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `CHAT_BASE_URL`: default `http://127.0.0.1:8000`
    /// - `CHAT_SESSION_COOKIE`: raw cookie header, e.g. `sessionid=...`
    /// - `CHAT_PREFS_PATH`: default `$XDG_CONFIG_HOME/chat-cli/preferences.json`
    /// - `CHAT_HISTORY_DEBOUNCE_MS`: default 500
    /// - `CHAT_BALANCE_REFRESH_MS`: default 1000
    /// - `CHAT_CONNECT_TIMEOUT_SECS`: default 10
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("CHAT_BASE_URL")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let mut config = Self::new(base_url);

        config.session_cookie = lookup("CHAT_SESSION_COOKIE").filter(|s| !s.is_empty());
        config.preferences_path = lookup("CHAT_PREFS_PATH")
            .filter(|s| !s.is_empty())
            .map_or_else(|| default_preferences_path(&lookup), PathBuf::from);
        config.history_debounce = Duration::from_millis(parse_u64(
            lookup("CHAT_HISTORY_DEBOUNCE_MS"),
            DEFAULT_HISTORY_DEBOUNCE_MS,
        ));
        config.balance_refresh_delay = Duration::from_millis(parse_u64(
            lookup("CHAT_BALANCE_REFRESH_MS"),
            DEFAULT_BALANCE_REFRESH_MS,
        ));
        config.connect_timeout = Duration::from_secs(parse_u64(
            lookup("CHAT_CONNECT_TIMEOUT_SECS"),
            DEFAULT_CONNECT_TIMEOUT_SECS,
        ));
        config
    }

    /// Replace the base URL, dropping any trailing slash.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
    }

    /// Websocket URL of the chat channel.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] unless the base URL is `http://` or `https://`.
    pub fn ws_url(&self) -> Result<String, ClientError> {
        if let Some(rest) = self.base_url.strip_prefix("http://") {
            return Ok(format!("ws://{rest}{WS_CHAT_PATH}"));
        }
        if let Some(rest) = self.base_url.strip_prefix("https://") {
            return Ok(format!("wss://{rest}{WS_CHAT_PATH}"));
        }
        Err(ClientError::InvalidBaseUrl(self.base_url.clone()))
    }

    /// Absolute URL for an HTTP path on the backend.
    #[must_use]
    pub fn http_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn default_preferences_path(lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    let base = lookup("XDG_CONFIG_HOME")
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .or_else(|| lookup("HOME").map(|home| PathBuf::from(home).join(".config")));
    match base {
        Some(dir) => dir.join(APP_DIR).join(PREFERENCES_FILE),
        None => PathBuf::from(PREFERENCES_FILE),
    }
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
