//! The fixed catalog of tools exposed over MCP.

use std::sync::Arc;

use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Arguments for `get_issue`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetIssueArgs {
    /// The issue key (e.g., 'PROJ-123')
    pub issue_key: String,
}

/// Arguments for `search_issues`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchIssuesArgs {
    /// JQL query string (e.g., 'project = PROJ AND status = Open')
    pub jql: String,
    /// Maximum number of results to return (default: 50)
    pub max_results: Option<u32>,
    /// Fields to return for each issue (default: JIRA's navigable fields)
    pub fields: Option<Vec<String>>,
}

/// Arguments for `get_assigned_issues`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AssignedIssuesArgs {
    /// Restrict results to this project key (e.g., 'PROJ')
    pub project_key: Option<String>,
    /// Maximum number of results to return (default: 50)
    pub max_results: Option<u32>,
}

/// Arguments for `get_issues_by_type`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct IssuesByTypeArgs {
    /// The issue type name (e.g., 'Bug', 'Story')
    pub issue_type: String,
    /// Restrict results to this project key (e.g., 'PROJ')
    pub project_key: Option<String>,
    /// Maximum number of results to return (default: 50)
    pub max_results: Option<u32>,
}

/// Arguments for tools that take none.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct NoArgs {}

/// A tool in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JiraTool {
    GetIssue,
    SearchIssues,
    GetAssignedIssues,
    GetIssuesByType,
    GetProjects,
    GetIssueTypes,
}

impl JiraTool {
    /// Every tool, in the order they are advertised.
    pub const ALL: [JiraTool; 6] = [
        JiraTool::GetIssue,
        JiraTool::SearchIssues,
        JiraTool::GetAssignedIssues,
        JiraTool::GetIssuesByType,
        JiraTool::GetProjects,
        JiraTool::GetIssueTypes,
    ];

    /// The name callers invoke the tool by.
    pub fn name(self) -> &'static str {
        match self {
            JiraTool::GetIssue => "get_issue",
            JiraTool::SearchIssues => "search_issues",
            JiraTool::GetAssignedIssues => "get_assigned_issues",
            JiraTool::GetIssuesByType => "get_issues_by_type",
            JiraTool::GetProjects => "get_projects",
            JiraTool::GetIssueTypes => "get_issue_types",
        }
    }

    /// Look a tool up by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            JiraTool::GetIssue => "Get a JIRA issue by key, returning the full issue JSON.",
            JiraTool::SearchIssues => "Search JIRA issues with a JQL query.",
            JiraTool::GetAssignedIssues => {
                "Get issues assigned to the current user, most recently updated first."
            }
            JiraTool::GetIssuesByType => {
                "Get issues of a given type, optionally within one project, most recently updated first."
            }
            JiraTool::GetProjects => "List all JIRA projects visible to the current user.",
            JiraTool::GetIssueTypes => "List all JIRA issue types.",
        }
    }

    /// JSON schema for the tool's arguments.
    pub fn schema(self) -> Value {
        match self {
            JiraTool::GetIssue => schema_value::<GetIssueArgs>(),
            JiraTool::SearchIssues => schema_value::<SearchIssuesArgs>(),
            JiraTool::GetAssignedIssues => schema_value::<AssignedIssuesArgs>(),
            JiraTool::GetIssuesByType => schema_value::<IssuesByTypeArgs>(),
            JiraTool::GetProjects | JiraTool::GetIssueTypes => schema_value::<NoArgs>(),
        }
    }

    /// The MCP tool definition.
    pub fn definition(self) -> Tool {
        let schema_map = match self.schema() {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Tool {
            name: self.name().into(),
            description: Some(self.description().into()),
            input_schema: Arc::new(schema_map),
            annotations: None,
        }
    }
}

/// The definitions of every tool.
pub fn catalog() -> Vec<Tool> {
    JiraTool::ALL.into_iter().map(JiraTool::definition).collect()
}

fn schema_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| serde_json::json!({ "type": "object" }))
}
