//! Authentication handling for JIRA API.
//!
//! JIRA Cloud accepts HTTP Basic Auth with the username (email) and an API
//! token as the password.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::config::Credentials;

/// Authentication credentials for JIRA.
#[derive(Debug, Clone)]
pub struct Auth {
    /// The username sent with every request.
    username: String,
    /// The Base64-encoded authorization header value.
    auth_header: String,
}

impl Auth {
    /// Create new authentication credentials from a username and token.
    ///
    /// The token is immediately encoded and the raw token is not stored.
    pub fn new(username: &str, token: &str) -> Self {
        let auth_header = build_auth_header(username, token);
        Self {
            username: username.to_string(),
            auth_header,
        }
    }

    /// Create authentication from resolved credentials.
    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(&credentials.username, &credentials.api_token)
    }

    /// Get the authorization header value for HTTP requests.
    ///
    /// Returns the complete "Basic ..." header value.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }

    /// Get the username.
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Build the Basic Auth header value.
///
/// Encodes "username:token" in Base64 and prepends "Basic ".
fn build_auth_header(username: &str, token: &str) -> String {
    let credentials = format!("{}:{}", username, token);
    let encoded = BASE64.encode(credentials.as_bytes());
    format!("Basic {}", encoded)
}
