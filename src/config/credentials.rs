//! JIRA credentials.

use std::fmt;

use super::env::EnvFileSource;
use super::{
    ConfigError, ConfigSource, Result, API_TOKEN_KEY, BASE_URL_KEY, REQUIRED_KEYS, USERNAME_KEY,
};

/// The connection details needed to talk to a JIRA instance.
///
/// A `Credentials` value is always fully populated: every field is non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The JIRA instance URL (e.g., "https://company.atlassian.net").
    pub base_url: String,
    /// The username used for Basic authentication.
    pub username: String,
    /// The API token used as the Basic authentication password.
    pub api_token: String,
}

impl Credentials {
    /// Read credentials from a configuration source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingCredentials` naming every required key
    /// that is absent or empty.
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self> {
        let mut values = source.load(&REQUIRED_KEYS);

        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|key| values.get(**key).map_or(true, |v| v.trim().is_empty()))
            .map(|key| key.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials(missing));
        }

        let mut take = |key: &str| values.remove(key).unwrap_or_default();
        Ok(Self {
            base_url: take(BASE_URL_KEY),
            username: take(USERNAME_KEY),
            api_token: take(API_TOKEN_KEY),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// Force a reload of the default env file and read the JIRA credentials.
///
/// This is the only place a missing credential is a hard error; incidental
/// reloads elsewhere merely warn.
pub fn get_jira_config() -> Result<Credentials> {
    Credentials::from_source(&EnvFileSource::default())
}
