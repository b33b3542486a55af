//! API error types for JIRA client.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;

/// Fallback message when a JIRA error body carries no `errorMessages`.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// A normalized error reported by the JIRA server.
///
/// Carries the HTTP status and a single human-readable message taken from
/// the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JiraError {
    /// The HTTP status code returned by JIRA.
    pub status: u16,
    /// The first entry of `errorMessages`, or "Unknown error".
    pub err: String,
}

impl JiraError {
    /// Build an error from a status code and a raw response body.
    pub fn from_body(status: u16, body: &str) -> Self {
        let err = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                json.get("errorMessages")?
                    .as_array()?
                    .first()?
                    .as_str()
                    .map(str::to_string)
            })
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());

        Self { status, err }
    }
}

impl fmt::Display for JiraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JIRA returned HTTP {}: {}", self.status, self.err)
    }
}

/// Errors that can occur when interacting with the JIRA API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// JIRA answered with a non-success status.
    #[error("{0}")]
    Remote(JiraError),

    /// No usable response: connection failure, timeout, or an unparseable body.
    #[error("Request failed: {message}")]
    Transport { message: String },

    /// Credentials could not be resolved when (re)building the client.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create a transport failure from any error message.
    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::Transport {
            message: message.into(),
        }
    }

    /// The HTTP status, if JIRA produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote(e) => Some(e.status),
            _ => None,
        }
    }

    /// Render the error in its wire shape.
    ///
    /// Remote errors keep `{status, err}`; everything else is `{error}`
    /// without a status field.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ApiError::Remote(e) => serde_json::json!({ "status": e.status, "err": e.err }),
            ApiError::Transport { message } => serde_json::json!({ "error": message }),
            ApiError::Config(e) => serde_json::json!({ "error": e.to_string() }),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::transport(e.to_string())
    }
}
