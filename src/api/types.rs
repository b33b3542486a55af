//! JIRA API request and response types.
//!
//! Only the envelopes are typed. Issues, projects, and issue types are kept
//! as opaque JSON objects and passed through unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /rest/api/2/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// The JQL query string.
    pub jql: String,
    /// Maximum number of issues to return.
    pub max_results: u32,
    /// Fields to include for each issue, in order. Empty means JIRA's default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// Search result from a JQL query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The matching issues.
    #[serde(default)]
    pub issues: Vec<Issue>,
    /// Total number of matching issues on the server.
    #[serde(default)]
    pub total: u64,
    /// Remaining envelope fields (`startAt`, `maxResults`, `expand`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A JIRA issue, returned verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Issue(pub Map<String, Value>);

impl Issue {
    /// The issue key (e.g., "PROJ-123"), if present.
    pub fn key(&self) -> Option<&str> {
        self.0.get("key").and_then(Value::as_str)
    }
}

/// A JIRA project, returned verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Project(pub Map<String, Value>);

impl Project {
    /// The project key (e.g., "PROJ"), if present.
    pub fn key(&self) -> Option<&str> {
        self.0.get("key").and_then(Value::as_str)
    }
}

/// A JIRA issue type, returned verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueType(pub Map<String, Value>);

impl IssueType {
    /// The issue type name (e.g., "Bug"), if present.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }
}
