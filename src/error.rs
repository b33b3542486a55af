//! Centralized error types for the JIRA MCP server.
//!
//! Aggregates the configuration and API errors so the binary can report a
//! startup failure with a user-friendly message.

use thiserror::Error;

use crate::api::error::ApiError;
use crate::config::ConfigError;

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// IO errors (binding a port, writing logs, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// MCP protocol or transport errors.
    #[error("MCP server error: {0}")]
    Server(String),
}

impl AppError {
    /// Create a server error.
    pub fn server(msg: impl Into<String>) -> Self {
        AppError::Server(msg.into())
    }

    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(ConfigError::MissingCredentials(keys))
            | AppError::Api(ApiError::Config(ConfigError::MissingCredentials(keys))) => format!(
                "JIRA credentials are not configured. Missing: {}.",
                keys.join(", ")
            ),
            AppError::Config(e) | AppError::Api(ApiError::Config(e)) => {
                format!("Configuration error: {}", e)
            }
            AppError::Api(ApiError::Remote(e)) => {
                format!("JIRA rejected the request (HTTP {}): {}", e.status, e.err)
            }
            AppError::Api(ApiError::Transport { message }) => {
                format!("Could not reach JIRA: {}", message)
            }
            AppError::Io(e) => format!("A file or network operation failed: {}", e),
            AppError::Server(msg) => format!("MCP server error: {}", msg),
        }
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Config(ConfigError::MissingCredentials(_))
            | AppError::Api(ApiError::Config(ConfigError::MissingCredentials(_))) => Some(
                "Set JIRA_BASE_URL, JIRA_USERNAME and JIRA_API_TOKEN in the environment or in a .env file.",
            ),
            AppError::Api(ApiError::Remote(e)) if e.status == 401 => {
                Some("Check your API token at https://id.atlassian.com/manage-profile/security/api-tokens")
            }
            AppError::Api(ApiError::Transport { .. }) => {
                Some("Check your network connection and JIRA_BASE_URL.")
            }
            _ => None,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
