//! JIRA API client implementation.
//!
//! This module provides the client for the JIRA REST API v2. It handles
//! authentication, request construction, and error normalization. Failed
//! calls are never retried; the caller sees the first failure.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use super::auth::Auth;
use super::error::{ApiError, JiraError, Result};
use super::jql::{self, DEFAULT_MAX_RESULTS};
use super::sink::ResponseSink;
use super::types::{Issue, IssueType, Project, SearchParams, SearchResponse};
use crate::config::{ConfigSource, Credentials, StaticSource};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP methods used against the JIRA API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

/// The JIRA API client.
///
/// Credentials are read once at construction and again on
/// [`reload_config`](JiraClient::reload_config); individual requests never
/// touch the configuration source. Clones share the HTTP connection pool.
#[derive(Clone)]
pub struct JiraClient {
    /// The HTTP client.
    client: Client,
    /// The base URL for the JIRA instance.
    base_url: String,
    /// Authentication credentials.
    auth: Auth,
    /// Where credentials are re-read from.
    config: Arc<dyn ConfigSource>,
    /// Receives every successful response body.
    sink: Arc<dyn ResponseSink>,
}

impl fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl JiraClient {
    /// Create a new JIRA client from a configuration source.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any of the required credentials is missing or empty
    /// - The HTTP client cannot be built
    #[instrument(skip_all)]
    pub fn new(config: Arc<dyn ConfigSource>, sink: Arc<dyn ResponseSink>) -> Result<Self> {
        let credentials = Credentials::from_source(config.as_ref())?;
        let client = Self::build_http_client()?;

        let auth = Auth::from_credentials(&credentials);
        info!(base_url = %credentials.base_url, username = auth.username(), "Creating JIRA client");

        Ok(Self {
            client,
            base_url: normalize_base_url(&credentials.base_url),
            auth,
            config,
            sink,
        })
    }

    /// Create a new JIRA client with explicit credentials.
    ///
    /// [`reload_config`](JiraClient::reload_config) will re-apply the same
    /// credentials.
    pub fn with_credentials(credentials: &Credentials, sink: Arc<dyn ResponseSink>) -> Result<Self> {
        let source = StaticSource::from_credentials(
            &credentials.base_url,
            &credentials.username,
            &credentials.api_token,
        );
        Self::new(Arc::new(source), sink)
    }

    /// Build the HTTP client with appropriate settings.
    fn build_http_client() -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::from)
    }

    /// Re-read credentials from the configuration source.
    ///
    /// On failure the client keeps its previous credentials.
    #[instrument(skip(self))]
    pub fn reload_config(&mut self) -> Result<()> {
        let credentials = Credentials::from_source(self.config.as_ref()).map_err(|e| {
            error!("Failed to reload JIRA configuration: {}", e);
            e
        })?;

        self.base_url = normalize_base_url(&credentials.base_url);
        self.auth = Auth::from_credentials(&credentials);

        debug!(
            base_url = %self.base_url,
            username = self.auth.username(),
            "JIRA configuration reloaded"
        );
        Ok(())
    }

    /// Perform an authenticated request and decode the JSON response.
    ///
    /// The body is only sent for `POST`. Successful bodies are mirrored to the
    /// response sink before decoding.
    #[instrument(skip(self, body), fields(method = ?method))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: RequestMethod,
        body: Option<&Value>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let builder = match method {
            RequestMethod::Get => self.client.get(&url),
            RequestMethod::Post => self.client.post(&url),
        }
        .header(header::AUTHORIZATION, self.auth.header_value())
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json");

        let builder = match (method, body) {
            (RequestMethod::Post, Some(body)) => builder.json(body),
            _ => builder,
        };

        let response = builder.send().await.map_err(|e| {
            error!("Request to {} failed: {}", endpoint, e);
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            debug!("Error response body: {}", error_body);

            let err = JiraError::from_body(status.as_u16(), &error_body);
            warn!(status = err.status, "JIRA returned an error: {}", err.err);
            return Err(ApiError::Remote(err));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ApiError::transport(format!("Failed to parse response: {}", e)))?;

        if let Err(e) = self.sink.record(endpoint, &value) {
            warn!("Failed to log response for {}: {}", endpoint, e);
        }

        serde_json::from_value(value)
            .map_err(|e| ApiError::transport(format!("Unexpected response shape: {}", e)))
    }

    /// Get a single issue by key.
    ///
    /// The key is appended to the path as given.
    #[instrument(skip(self), fields(issue_key = %key))]
    pub async fn get_issue(&self, key: &str) -> Result<Issue> {
        debug!("Fetching issue");
        let endpoint = format!("/rest/api/2/issue/{}", key);
        self.request(&endpoint, RequestMethod::Get, None).await
    }

    /// Search for issues using JQL.
    #[instrument(skip(self), fields(jql = %params.jql))]
    pub async fn search_issues(&self, params: &SearchParams) -> Result<SearchResponse> {
        debug!("Searching issues: maxResults={}", params.max_results);

        let body = serde_json::to_value(params)
            .map_err(|e| ApiError::transport(format!("Failed to encode search: {}", e)))?;
        let result: SearchResponse = self
            .request("/rest/api/2/search", RequestMethod::Post, Some(&body))
            .await?;

        debug!("Found {} issues (total: {})", result.issues.len(), result.total);
        Ok(result)
    }

    /// Get issues assigned to the current user, most recently updated first.
    pub async fn get_assigned_issues(
        &self,
        project_key: Option<&str>,
        max_results: Option<u32>,
    ) -> Result<SearchResponse> {
        self.search_issues(&SearchParams {
            jql: jql::assigned_issues_jql(project_key),
            max_results: max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            fields: jql::default_fields(),
        })
        .await
    }

    /// Get issues of a given type, most recently updated first.
    pub async fn get_issues_by_type(
        &self,
        issue_type: &str,
        project_key: Option<&str>,
        max_results: Option<u32>,
    ) -> Result<SearchResponse> {
        self.search_issues(&SearchParams {
            jql: jql::issues_by_type_jql(issue_type, project_key),
            max_results: max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            fields: jql::default_fields(),
        })
        .await
    }

    /// List all projects visible to the user.
    #[instrument(skip(self))]
    pub async fn get_projects(&self) -> Result<Vec<Project>> {
        self.request("/rest/api/2/project", RequestMethod::Get, None)
            .await
    }

    /// List all issue types.
    #[instrument(skip(self))]
    pub async fn get_issue_types(&self) -> Result<Vec<IssueType>> {
        self.request("/rest/api/2/issuetype", RequestMethod::Get, None)
            .await
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Normalize the base URL by removing trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');

    // Warn if not HTTPS (but don't enforce for local testing)
    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::sink::NoopSink;
    use crate::config::{API_TOKEN_KEY, BASE_URL_KEY, USERNAME_KEY};
    use serde_json::json;
    use std::collections::HashMap;
    use std::io;
    use std::sync::Mutex;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<(String, Value)>>,
    }

    impl ResponseSink for RecordingSink {
        fn record(&self, endpoint: &str, body: &Value) -> io::Result<()> {
            self.records
                .lock()
                .unwrap()
                .push((endpoint.to_string(), body.clone()));
            Ok(())
        }
    }

    struct FailingSink;

    impl ResponseSink for FailingSink {
        fn record(&self, _endpoint: &str, _body: &Value) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    /// A source whose values can be changed between reads.
    struct MutableSource(Mutex<HashMap<String, String>>);

    impl MutableSource {
        fn set(&self, key: &str, value: &str) {
            self.0.lock().unwrap().insert(key.to_string(), value.to_string());
        }
    }

    impl ConfigSource for MutableSource {
        fn load(&self, keys: &[&str]) -> HashMap<String, String> {
            let values = self.0.lock().unwrap();
            keys.iter()
                .filter_map(|k| values.get(*k).map(|v| (k.to_string(), v.clone())))
                .collect()
        }
    }

    fn credentials(base_url: &str) -> Credentials {
        Credentials {
            base_url: base_url.to_string(),
            username: "u".to_string(),
            api_token: "t".to_string(),
        }
    }

    fn test_client(server: &MockServer) -> JiraClient {
        JiraClient::with_credentials(&credentials(&server.uri()), Arc::new(NoopSink)).unwrap()
    }

    #[test]
    fn test_normalize_base_url_removes_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://company.atlassian.net/"),
            "https://company.atlassian.net"
        );
    }

    #[test]
    fn test_normalize_base_url_handles_multiple_slashes() {
        assert_eq!(
            normalize_base_url("https://company.atlassian.net///"),
            "https://company.atlassian.net"
        );
    }

    #[test]
    fn test_normalize_base_url_preserves_path() {
        assert_eq!(
            normalize_base_url("https://company.atlassian.net/jira/"),
            "https://company.atlassian.net/jira"
        );
    }

    #[test]
    fn test_new_fails_without_credentials() {
        let source = StaticSource::new().with(BASE_URL_KEY, "https://x.atlassian.net");
        let result = JiraClient::new(Arc::new(source), Arc::new(NoopSink));

        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[tokio::test]
    async fn test_get_issue_single_authenticated_get() {
        let server = MockServer::start().await;
        let body = json!({"id": "10001", "key": "PROJ-1", "fields": {"summary": "Fix it"}});

        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/PROJ-1"))
            .and(header("authorization", "Basic dTp0"))
            .and(header("accept", "application/json"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let issue = test_client(&server).get_issue("PROJ-1").await.unwrap();
        assert_eq!(serde_json::to_value(&issue).unwrap(), body);
    }

    #[tokio::test]
    async fn test_get_projects_end_to_end() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/project"))
            .and(header("authorization", "Basic dTp0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "1", "key": "ABC", "name": "Alpha"},
                {"id": "2", "key": "XYZ", "name": "Omega"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let projects = test_client(&server).get_projects().await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].key(), Some("ABC"));
        assert_eq!(projects[1].key(), Some("XYZ"));
    }

    #[tokio::test]
    async fn test_get_issue_types() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/issuetype"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": "1", "name": "Bug"}, {"id": "2", "name": "Task"}])),
            )
            .mount(&server)
            .await;

        let types = test_client(&server).get_issue_types().await.unwrap();
        let names: Vec<_> = types.iter().filter_map(IssueType::name).collect();
        assert_eq!(names, vec!["Bug", "Task"]);
    }

    #[tokio::test]
    async fn test_search_issues_posts_params_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/api/2/search"))
            .and(body_json(json!({
                "jql": "project = ABC",
                "maxResults": 5,
                "fields": ["summary"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "startAt": 0,
                "maxResults": 5,
                "total": 1,
                "issues": [{"key": "ABC-1"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = test_client(&server)
            .search_issues(&SearchParams {
                jql: "project = ABC".to_string(),
                max_results: 5,
                fields: vec!["summary".to_string()],
            })
            .await
            .unwrap();

        assert_eq!(result.total, 1);
        assert_eq!(result.issues[0].key(), Some("ABC-1"));
    }

    #[tokio::test]
    async fn test_get_assigned_issues_builds_query() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/api/2/search"))
            .and(body_json(json!({
                "jql": "assignee = currentUser() AND project = ABC ORDER BY updated DESC",
                "maxResults": 50,
                "fields": ["summary", "description", "status", "issuetype", "priority", "assignee", "project"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "issues": []})))
            .expect(1)
            .mount(&server)
            .await;

        let result = test_client(&server)
            .get_assigned_issues(Some("ABC"), None)
            .await
            .unwrap();
        assert_eq!(result.total, 0);
    }

    #[tokio::test]
    async fn test_get_issues_by_type_builds_query() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/api/2/search"))
            .and(body_json(json!({
                "jql": "issuetype = \"Bug\" ORDER BY updated DESC",
                "maxResults": 10,
                "fields": ["summary", "description", "status", "issuetype", "priority", "assignee", "project"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "issues": []})))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server)
            .get_issues_by_type("Bug", None, Some(10))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_not_found_is_normalized() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/issue/NOPE-1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "errorMessages": ["Issue does not exist"],
                "errors": {}
            })))
            .mount(&server)
            .await;

        let err = test_client(&server).get_issue("NOPE-1").await.unwrap_err();
        match err {
            ApiError::Remote(e) => assert_eq!(
                e,
                JiraError {
                    status: 404,
                    err: "Issue does not exist".to_string()
                }
            ),
            other => panic!("Expected Remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_without_messages_is_unknown() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/project"))
            .respond_with(ResponseTemplate::new(500).set_body_string(""))
            .mount(&server)
            .await;

        let err = test_client(&server).get_projects().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_json()["err"], "Unknown error");
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        // Nothing listens on port 1.
        let client =
            JiraClient::with_credentials(&credentials("http://127.0.0.1:1"), Arc::new(NoopSink))
                .unwrap();

        let err = client.get_projects().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
        assert!(err.status().is_none());
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_transport_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/project"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = test_client(&server).get_projects().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_successful_response_is_recorded() {
        let server = MockServer::start().await;
        let sink = Arc::new(RecordingSink::default());

        Mock::given(method("GET"))
            .and(path("/rest/api/2/issuetype"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "Bug"}])))
            .mount(&server)
            .await;

        let client =
            JiraClient::with_credentials(&credentials(&server.uri()), sink.clone()).unwrap();
        client.get_issue_types().await.unwrap();

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, "/rest/api/2/issuetype");
        assert_eq!(records[0].1, json!([{"name": "Bug"}]));
    }

    #[tokio::test]
    async fn test_failed_response_is_not_recorded() {
        let server = MockServer::start().await;
        let sink = Arc::new(RecordingSink::default());

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client =
            JiraClient::with_credentials(&credentials(&server.uri()), sink.clone()).unwrap();
        assert!(client.get_projects().await.is_err());
        assert!(sink.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_fail_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/2/project"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client =
            JiraClient::with_credentials(&credentials(&server.uri()), Arc::new(FailingSink))
                .unwrap();
        assert!(client.get_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reload_config_picks_up_rotated_token() {
        let server = MockServer::start().await;

        // base64("u:new")
        Mock::given(method("GET"))
            .and(path("/rest/api/2/project"))
            .and(header("authorization", "Basic dTpuZXc="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let source = Arc::new(MutableSource(Mutex::new(HashMap::new())));
        source.set(BASE_URL_KEY, &server.uri());
        source.set(USERNAME_KEY, "u");
        source.set(API_TOKEN_KEY, "old");

        let mut client = JiraClient::new(source.clone(), Arc::new(NoopSink)).unwrap();
        source.set(API_TOKEN_KEY, "new");
        client.reload_config().unwrap();

        client.get_projects().await.unwrap();
    }

    #[test]
    fn test_reload_config_failure_keeps_previous_credentials() {
        let source = Arc::new(MutableSource(Mutex::new(HashMap::new())));
        source.set(BASE_URL_KEY, "https://x.atlassian.net/");
        source.set(USERNAME_KEY, "u");
        source.set(API_TOKEN_KEY, "t");

        let mut client = JiraClient::new(source.clone(), Arc::new(NoopSink)).unwrap();
        source.set(API_TOKEN_KEY, "");

        assert!(matches!(client.reload_config(), Err(ApiError::Config(_))));
        assert_eq!(client.base_url(), "https://x.atlassian.net");
        assert_eq!(client.auth.header_value(), "Basic dTp0");
    }
}
