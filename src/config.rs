//! Service configuration parsed from environment variables.
//!
//! `main` calls `dotenvy::dotenv()` first, so a local `.env` file can supply
//! any of these. Only `CONTENT_API_URL` is required; everything else falls
//! back to a default when unset or unparseable.

use std::str::FromStr;

use crate::error::ErrorCode;
use crate::services::autosave::AutosaveConfig;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPLOAD_MAX_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_SETTINGS_HISTORY_LIMIT: usize = 20;
pub const DEFAULT_HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {var}")]
    Missing { var: &'static str },
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "E_CONFIG_MISSING",
            Self::Invalid { .. } => "E_CONFIG_INVALID",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Base URL of the hosting application's content API, without trailing slash.
    pub content_api_url: String,
    /// Bearer token sent with every content API call, when set.
    pub content_api_token: Option<String>,
    pub upload_max_bytes: u64,
    pub settings_history_limit: usize,
    pub http: HttpTimeouts,
    pub autosave: AutosaveConfig,
}

impl Config {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `CONTENT_API_URL`: `http://` or `https://` base URL
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `CONTENT_API_TOKEN`: bearer token
    /// - `UPLOAD_MAX_BYTES`: default 10 MiB
    /// - `SETTINGS_HISTORY_LIMIT`: default 20
    /// - `HTTP_REQUEST_TIMEOUT_SECS` / `HTTP_CONNECT_TIMEOUT_SECS`: default 30 / 10
    /// - `AUTOSAVE_*`: see [`AutosaveConfig::from_env`]
    ///
    /// # Errors
    ///
    /// Returns `Missing` when `CONTENT_API_URL` is unset and `Invalid` when it
    /// is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = std::env::var("CONTENT_API_URL").map_err(|_| ConfigError::Missing { var: "CONTENT_API_URL" })?;
        let content_api_url = parse_base_url(&raw_url)
            .ok_or_else(|| ConfigError::Invalid { var: "CONTENT_API_URL", value: raw_url.clone() })?;

        let content_api_token = std::env::var("CONTENT_API_TOKEN")
            .ok()
            .map(|token| token.trim().to_owned())
            .filter(|token| !token.is_empty());

        Ok(Self {
            port: env_parse("PORT", DEFAULT_PORT),
            content_api_url,
            content_api_token,
            upload_max_bytes: env_parse("UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES),
            settings_history_limit: env_parse("SETTINGS_HISTORY_LIMIT", DEFAULT_SETTINGS_HISTORY_LIMIT),
            http: HttpTimeouts {
                request_secs: env_parse("HTTP_REQUEST_TIMEOUT_SECS", DEFAULT_HTTP_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse("HTTP_CONNECT_TIMEOUT_SECS", DEFAULT_HTTP_CONNECT_TIMEOUT_SECS),
            },
            autosave: AutosaveConfig::from_env(),
        })
    }
}

/// Parse `key` from the environment, falling back to `default` when the
/// variable is unset or does not parse.
pub(crate) fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_base_url(raw: &str) -> Option<String> {
    let url = raw.trim().trim_end_matches('/');
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    if rest.is_empty() {
        return None;
    }
    Some(url.to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
