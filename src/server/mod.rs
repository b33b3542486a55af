//! MCP server exposing the JIRA client as tools.
//!
//! [`JiraToolServer`] maps each tool call onto one [`JiraClient`] method.
//! JIRA failures are reported as tool results with `is_error` set so the
//! caller can read the `{status, err}` shape; only protocol misuse (unknown
//! tool, malformed arguments) becomes an MCP error.

pub mod tools;

use std::net::SocketAddr;
use std::sync::Arc;

use rmcp::model::{
    Annotated, CallToolRequestParam, CallToolResult, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, RawContent, RawTextContent, ServerCapabilities,
    ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::transport::io::stdio;
use rmcp::transport::sse_server::SseServer;
use rmcp::{Error as McpError, RoleServer, ServerHandler, ServiceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::error::{ApiError, Result as ApiResult};
use crate::api::{JiraClient, SearchParams};
use crate::api::jql::DEFAULT_MAX_RESULTS;
use crate::error::{AppError, Result};
use tools::{
    AssignedIssuesArgs, GetIssueArgs, IssuesByTypeArgs, JiraTool, NoArgs, SearchIssuesArgs,
};

/// Name reported to MCP clients.
pub const SERVER_NAME: &str = "jira-mcp";

const INSTRUCTIONS: &str = "Read-only access to JIRA. Use get_issue to fetch an issue by key, \
search_issues to run a JQL query, get_assigned_issues and get_issues_by_type for common \
queries, and get_projects / get_issue_types to discover valid project keys and type names.";

/// The MCP tool server.
///
/// Credentials are reloaded from the client's configuration source before
/// every tool call. Reloads are serialized; the JIRA request itself runs on a
/// snapshot of the client and is not.
#[derive(Debug, Clone)]
pub struct JiraToolServer {
    client: Arc<Mutex<JiraClient>>,
}

/// A tool invocation with its arguments already validated.
enum ToolCall {
    GetIssue(GetIssueArgs),
    SearchIssues(SearchIssuesArgs),
    GetAssignedIssues(AssignedIssuesArgs),
    GetIssuesByType(IssuesByTypeArgs),
    GetProjects,
    GetIssueTypes,
}

impl ToolCall {
    fn parse(tool: JiraTool, arguments: Map<String, Value>) -> std::result::Result<Self, McpError> {
        Ok(match tool {
            JiraTool::GetIssue => ToolCall::GetIssue(parse_arguments(arguments)?),
            JiraTool::SearchIssues => ToolCall::SearchIssues(parse_arguments(arguments)?),
            JiraTool::GetAssignedIssues => ToolCall::GetAssignedIssues(parse_arguments(arguments)?),
            JiraTool::GetIssuesByType => ToolCall::GetIssuesByType(parse_arguments(arguments)?),
            JiraTool::GetProjects => {
                let _: NoArgs = parse_arguments(arguments)?;
                ToolCall::GetProjects
            }
            JiraTool::GetIssueTypes => {
                let _: NoArgs = parse_arguments(arguments)?;
                ToolCall::GetIssueTypes
            }
        })
    }
}

impl JiraToolServer {
    /// Create a server backed by `client`.
    pub fn new(client: JiraClient) -> Self {
        Self {
            client: Arc::new(Mutex::new(client)),
        }
    }

    /// Invoke a tool by name.
    ///
    /// # Errors
    ///
    /// Returns an MCP `invalid_params` error for an unknown tool or arguments
    /// that do not match the tool's schema. JIRA failures and missing
    /// credentials are returned as `Ok` results with `is_error` set.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let tool = JiraTool::from_name(name).ok_or_else(|| {
            warn!("Unknown tool requested: {}", name);
            McpError::invalid_params(format!("Unknown tool: {}", name), None)
        })?;
        let call = ToolCall::parse(tool, arguments)?;

        info!(tool = name, "Tool invoked");

        Ok(match self.invoke(call).await {
            Ok(value) => success_result(&value),
            Err(e) => {
                warn!(tool = name, "Tool failed: {}", e);
                error_result(&e)
            }
        })
    }

    /// Reload credentials and return a snapshot of the refreshed client.
    async fn refreshed_client(&self) -> ApiResult<JiraClient> {
        let mut client = self.client.lock().await;
        client.reload_config()?;
        Ok(client.clone())
    }

    async fn invoke(&self, call: ToolCall) -> ApiResult<Value> {
        let client = self.refreshed_client().await?;

        match call {
            ToolCall::GetIssue(args) => to_value(client.get_issue(&args.issue_key).await),
            ToolCall::SearchIssues(args) => {
                let params = SearchParams {
                    jql: args.jql,
                    max_results: args.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
                    fields: args.fields.unwrap_or_default(),
                };
                to_value(client.search_issues(&params).await)
            }
            ToolCall::GetAssignedIssues(args) => to_value(
                client
                    .get_assigned_issues(args.project_key.as_deref(), args.max_results)
                    .await,
            ),
            ToolCall::GetIssuesByType(args) => to_value(
                client
                    .get_issues_by_type(
                        &args.issue_type,
                        args.project_key.as_deref(),
                        args.max_results,
                    )
                    .await,
            ),
            ToolCall::GetProjects => to_value(client.get_projects().await),
            ToolCall::GetIssueTypes => to_value(client.get_issue_types().await),
        }
    }
}

/// Parse tool arguments from a JSON map into a typed struct.
fn parse_arguments<T: DeserializeOwned>(
    arguments: Map<String, Value>,
) -> std::result::Result<T, McpError> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| McpError::invalid_params(format!("Invalid arguments: {e}"), None))
}

fn to_value<T: Serialize>(result: ApiResult<T>) -> ApiResult<Value> {
    result.and_then(|data| {
        serde_json::to_value(data)
            .map_err(|e| ApiError::transport(format!("Failed to encode result: {}", e)))
    })
}

fn text_result(text: String, is_error: bool) -> CallToolResult {
    CallToolResult {
        content: vec![Annotated::new(RawContent::Text(RawTextContent { text }), None)],
        is_error: Some(is_error),
    }
}

fn success_result(value: &Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    text_result(text, false)
}

fn error_result(error: &ApiError) -> CallToolResult {
    text_result(error.to_json().to_string(), true)
}

impl ServerHandler for JiraToolServer {
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: tools::catalog(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        self.dispatch(&request.name, request.arguments.unwrap_or_default())
            .await
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(INSTRUCTIONS.into()),
        }
    }
}

/// Serve MCP over stdin/stdout until the client disconnects or Ctrl-C.
pub async fn serve_stdio(server: JiraToolServer) -> Result<()> {
    info!("Starting MCP server via stdio");

    let service = server
        .serve(stdio())
        .await
        .map_err(|e| AppError::server(e.to_string()))?;

    tokio::select! {
        result = service.waiting() => {
            let reason = result.map_err(|e| AppError::server(e.to_string()))?;
            info!("MCP session ended: {:?}", reason);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}

/// Serve MCP over HTTP (server-sent events) on `port` until Ctrl-C.
pub async fn serve_http(server: JiraToolServer, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "Starting MCP server via HTTP");

    let sse = SseServer::serve(addr).await?;
    let ct = sse.with_service(move || server.clone());

    tokio::signal::ctrl_c().await?;
    debug!("Shutdown signal received, stopping HTTP transport");
    ct.cancel();

    Ok(())
}
