//! Configuration management for the JIRA MCP server.
//!
//! Credentials are resolved from the process environment, backed by an
//! optional `.env` file that is re-read on every credential access so that a
//! rotated token is picked up without restarting the server.

mod credentials;
mod env;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use credentials::{get_jira_config, Credentials};
pub use env::{get_config_value, reload_environment, EnvFileSource, DEFAULT_ENV_FILE};

/// Environment key holding the JIRA instance URL.
pub const BASE_URL_KEY: &str = "JIRA_BASE_URL";

/// Environment key holding the JIRA username (usually an email address).
pub const USERNAME_KEY: &str = "JIRA_USERNAME";

/// Environment key holding the JIRA API token.
pub const API_TOKEN_KEY: &str = "JIRA_API_TOKEN";

/// The keys that must be present before a client can be built.
pub const REQUIRED_KEYS: [&str; 3] = [BASE_URL_KEY, USERNAME_KEY, API_TOKEN_KEY];

/// Environment key for the HTTP transport port.
pub const HTTP_PORT_KEY: &str = "HTTP_PORT";

/// Port used by the HTTP transport when `HTTP_PORT` is unset.
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Environment key selecting the transport (`stdio` or `http`).
pub const TRANSPORT_KEY: &str = "MCP_TRANSPORT";

/// Errors that can occur while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required credentials are absent or empty.
    #[error("Missing required JIRA configuration: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),

    /// A configuration value is present but cannot be used.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A source of configuration values.
///
/// Every call to [`ConfigSource::load`] must reflect the current state of the
/// backing store; implementations never cache values between calls.
pub trait ConfigSource: Send + Sync {
    /// Load the values for `keys`. Keys without a value are omitted.
    fn load(&self, keys: &[&str]) -> HashMap<String, String>;
}

/// An in-memory configuration source.
///
/// Useful for embedding the client in another program or for tests that
/// should not touch the process environment.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    values: HashMap<String, String>,
}

impl StaticSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, returning the updated source.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    /// Build a source holding a complete set of credentials.
    pub fn from_credentials(base_url: &str, username: &str, api_token: &str) -> Self {
        Self::new()
            .with(BASE_URL_KEY, base_url)
            .with(USERNAME_KEY, username)
            .with(API_TOKEN_KEY, api_token)
    }
}

impl ConfigSource for StaticSource {
    fn load(&self, keys: &[&str]) -> HashMap<String, String> {
        keys.iter()
            .filter_map(|key| {
                self.values
                    .get(*key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect()
    }
}

/// The transport used to serve MCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// Server-sent events over HTTP.
    Http,
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" | "sse" => Ok(Transport::Http),
            other => Err(ConfigError::InvalidValue {
                key: TRANSPORT_KEY.to_string(),
                message: format!("unknown transport '{}', expected 'stdio' or 'http'", other),
            }),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => f.write_str("stdio"),
            Transport::Http => f.write_str("http"),
        }
    }
}

/// Parse the HTTP port, falling back to [`DEFAULT_HTTP_PORT`] when unset.
pub fn parse_http_port(value: Option<&str>) -> Result<u16> {
    match value {
        None => Ok(DEFAULT_HTTP_PORT),
        Some(raw) if raw.trim().is_empty() => Ok(DEFAULT_HTTP_PORT),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: HTTP_PORT_KEY.to_string(),
            message: format!("'{}' is not a valid port number", raw),
        }),
    }
}
