//! JQL builders for the canned issue queries.

/// Result limit used when the caller does not give one.
pub const DEFAULT_MAX_RESULTS: u32 = 50;

/// Fields projected by the canned queries.
pub const DEFAULT_FIELDS: [&str; 7] = [
    "summary",
    "description",
    "status",
    "issuetype",
    "priority",
    "assignee",
    "project",
];

const ORDER_BY_UPDATED: &str = " ORDER BY updated DESC";

/// JQL for issues assigned to the authenticated user.
pub fn assigned_issues_jql(project_key: Option<&str>) -> String {
    with_project("assignee = currentUser()".to_string(), project_key)
}

/// JQL for issues of a given type, e.g. `issuetype = "Bug"`.
pub fn issues_by_type_jql(issue_type: &str, project_key: Option<&str>) -> String {
    with_project(format!("issuetype = \"{}\"", issue_type), project_key)
}

fn with_project(mut jql: String, project_key: Option<&str>) -> String {
    if let Some(key) = project_key {
        jql.push_str(" AND project = ");
        jql.push_str(key);
    }
    jql.push_str(ORDER_BY_UPDATED);
    jql
}

/// The default field projection as owned strings.
pub fn default_fields() -> Vec<String> {
    DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()
}
