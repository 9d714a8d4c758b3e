//! Client configuration.
//!
//! # Responsibility
//! - Carry the REST root and static credential into the Remote Client.
//! - Load both from the process environment for binaries.
//!
//! # Invariants
//! - `base_url` is an absolute `http`/`https` URL.
//! - `api_key` is never empty and never printed by `Debug`.

use reqwest::Url;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

pub const ENV_BASE_URL: &str = "NOTEBOARD_BASE_URL";
pub const ENV_API_KEY: &str = "NOTEBOARD_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "NOTEBOARD_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{0}`")]
    MissingVar(&'static str),
    #[error("invalid base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("api key cannot be empty")]
    EmptyApiKey,
    #[error("api key contains characters not allowed in an http header")]
    InvalidApiKey,
    #[error("failed to build http client: {0}")]
    HttpClient(String),
    #[error("invalid timeout `{0}`; expected a positive number of seconds")]
    InvalidTimeout(String),
}

/// Connection settings for [`crate::RestNotesClient`].
#[derive(Clone)]
pub struct ClientConfig {
    base_url: Url,
    api_key: String,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Builds a config from an explicit REST root and key.
    ///
    /// A trailing slash on `base_url` is ignored.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(base_url)?;
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        if !api_key.chars().all(|ch| ch.is_ascii_graphic()) {
            return Err(ConfigError::InvalidApiKey);
        }
        Ok(Self {
            base_url,
            api_key,
            timeout: None,
        })
    }

    /// Reads `NOTEBOARD_BASE_URL`, `NOTEBOARD_API_KEY` and the optional
    /// `NOTEBOARD_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_BASE_URL).ok_or(ConfigError::MissingVar(ENV_BASE_URL))?;
        let api_key = lookup(ENV_API_KEY).ok_or(ConfigError::MissingVar(ENV_API_KEY))?;
        let mut config = Self::new(&base_url, api_key)?;
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout = Some(parse_timeout(&raw)?);
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Debug for ClientConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(trimmed).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme `{other}`"))),
    }
    if url.cannot_be_a_base() {
        return Err(invalid("url cannot be used as a base".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".to_string()));
    }
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
