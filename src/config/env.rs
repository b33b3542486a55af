//! Forced reloading of environment-backed configuration.
//!
//! Process environment variables are normally read once at startup. The
//! functions here delete the requested keys and re-parse the backing `.env`
//! file before every read, so edits to that file are observed immediately.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::{debug, trace, warn};

use super::ConfigSource;

/// The env file consulted when no explicit path is given.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Serializes reloads so a read never observes a half-rebuilt environment.
static RELOAD_LOCK: Mutex<()> = Mutex::new(());

/// The process environment as it was before the first reload.
static LAUNCH_ENV: OnceLock<HashMap<String, String>> = OnceLock::new();

/// Delete `keys` from the process environment and repopulate them.
///
/// Each key is first reset to the value it had when the process launched (or
/// removed if it had none), then the env file at `source_path` (default
/// `.env`) is overlaid. Values for `keys` in the file always win; other
/// variables in the file are only set when not already present.
///
/// A missing or malformed file is skipped with a warning. Keys that are still
/// absent after the reload are warned about but not rejected here.
///
/// Returns a snapshot of the full process environment after the reload.
pub fn reload_environment(source_path: Option<&Path>, keys: &[&str]) -> HashMap<String, String> {
    let _guard = RELOAD_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

    let launch = LAUNCH_ENV.get_or_init(unicode_vars);

    for key in keys {
        match launch.get(*key) {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }

    let path = source_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE));

    match read_env_file(&path) {
        Ok(entries) => {
            let count = entries.len();
            for (key, value) in entries {
                if keys.contains(&key.as_str()) || env::var_os(&key).is_none() {
                    env::set_var(&key, value);
                }
            }
            debug!(path = %path.display(), entries = count, "Reloaded env file");
        }
        Err(e) => {
            warn!(path = %path.display(), "Skipping env file reload: {}", e);
        }
    }

    for key in keys {
        if env::var_os(key).is_none() {
            warn!("Environment variable {} is not set after reload", key);
        }
    }

    unicode_vars()
}

/// Snapshot the process environment, skipping entries that are not valid UTF-8.
fn unicode_vars() -> HashMap<String, String> {
    env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Parse every entry of an env file, failing on the first malformed line.
fn read_env_file(path: &Path) -> dotenvy::Result<Vec<(String, String)>> {
    dotenvy::from_path_iter(path)?.collect()
}

/// Read a single value after forcing a reload of just that key.
///
/// Returns `fallback` when the key is unset after the reload.
pub fn get_config_value(key: &str, fallback: Option<&str>) -> Option<String> {
    let snapshot = reload_environment(None, &[key]);
    snapshot
        .get(key)
        .cloned()
        .or_else(|| fallback.map(str::to_string))
}

/// A [`ConfigSource`] backed by the process environment and an env file.
///
/// Every [`load`](ConfigSource::load) performs a full forced reload.
#[derive(Debug, Clone)]
pub struct EnvFileSource {
    path: PathBuf,
}

impl EnvFileSource {
    /// Create a source reading the env file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The env file this source reloads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a single value, forcing a reload of that key first.
    pub fn get_value(&self, key: &str, fallback: Option<&str>) -> Option<String> {
        self.load(&[key])
            .remove(key)
            .or_else(|| fallback.map(str::to_string))
    }
}

impl Default for EnvFileSource {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_FILE)
    }
}

impl ConfigSource for EnvFileSource {
    fn load(&self, keys: &[&str]) -> HashMap<String, String> {
        let mut snapshot = reload_environment(Some(&self.path), keys);
        trace!(keys = ?keys, "Loaded keys from environment");
        keys.iter()
            .filter_map(|key| snapshot.remove_entry(*key))
            .collect()
    }
}
