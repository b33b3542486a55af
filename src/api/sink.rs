//! Diagnostic mirroring of raw JIRA responses.
//!
//! Every successful response can be handed to a [`ResponseSink`]. The file
//! sink writes one pretty-printed JSON file per call; failures are reported
//! to the caller, which only logs them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::trace;

/// Directory used by [`FileResponseSink::default`].
pub const DEFAULT_RESPONSE_LOG_DIR: &str = "logs";

/// A destination for raw response bodies.
pub trait ResponseSink: Send + Sync {
    /// Record the body returned for `endpoint`.
    fn record(&self, endpoint: &str, body: &Value) -> io::Result<()>;
}

/// Discards every response.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ResponseSink for NoopSink {
    fn record(&self, _endpoint: &str, _body: &Value) -> io::Result<()> {
        Ok(())
    }
}

/// Writes each response to `<dir>/jira-<endpoint>-<unix millis>.json`.
#[derive(Debug, Clone)]
pub struct FileResponseSink {
    dir: PathBuf,
}

impl FileResponseSink {
    /// Create a sink writing into `dir`. The directory is created on demand.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory responses are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Build the artifact path for an endpoint at a given timestamp.
    fn artifact_path(&self, endpoint: &str, millis: u128) -> PathBuf {
        self.dir
            .join(format!("jira-{}-{}.json", endpoint.replace('/', "-"), millis))
    }
}

impl Default for FileResponseSink {
    fn default() -> Self {
        Self::new(DEFAULT_RESPONSE_LOG_DIR)
    }
}

impl ResponseSink for FileResponseSink {
    fn record(&self, endpoint: &str, body: &Value) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let path = self.artifact_path(endpoint, millis);

        let content = serde_json::to_string_pretty(body)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&path, content)?;

        trace!("Logged response to {:?}", path);
        Ok(())
    }
}
