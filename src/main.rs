//! jira-mcp - JIRA tools for MCP clients.
//!
//! Serves the tool catalog over stdio (default) or HTTP.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use jira_mcp::api::sink::DEFAULT_RESPONSE_LOG_DIR;
use jira_mcp::api::{FileResponseSink, JiraClient, NoopSink, ResponseSink};
use jira_mcp::config::{
    parse_http_port, EnvFileSource, Transport, DEFAULT_ENV_FILE, HTTP_PORT_KEY, TRANSPORT_KEY,
};
use jira_mcp::error::Result;
use jira_mcp::logging;
use jira_mcp::server::{serve_http, serve_stdio, JiraToolServer};

#[derive(Debug, Parser)]
#[command(name = "jira-mcp", version, about = "Expose JIRA issues and JQL search as MCP tools")]
struct Cli {
    /// Env file holding JIRA_BASE_URL, JIRA_USERNAME and JIRA_API_TOKEN
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Transport to serve on: stdio or http [default: $MCP_TRANSPORT, then stdio]
    #[arg(long)]
    transport: Option<Transport>,

    /// Port for the HTTP transport [default: $HTTP_PORT, then 3000]
    #[arg(long)]
    port: Option<u16>,

    /// Directory receiving one JSON file per successful JIRA response
    #[arg(long, default_value = DEFAULT_RESPONSE_LOG_DIR)]
    response_log_dir: PathBuf,

    /// Do not write per-response JSON files
    #[arg(long)]
    no_response_log: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        logging::init_stderr();
        warn!("File logging unavailable, logging to stderr: {}", e);
    }

    match run(cli).await {
        Ok(()) => {
            logging::shutdown();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Fatal: {}", e);
            eprintln!("Error: {}", e.user_message());
            if let Some(action) = e.suggested_action() {
                eprintln!("{}", action);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let source = Arc::new(EnvFileSource::new(&cli.env_file));

    let transport = match cli.transport {
        Some(transport) => transport,
        None => source
            .get_value(TRANSPORT_KEY, None)
            .map(|value| value.parse::<Transport>())
            .transpose()?
            .unwrap_or_default(),
    };

    info!(env_file = %source.path().display(), "Reading JIRA credentials");

    let sink: Arc<dyn ResponseSink> = if cli.no_response_log {
        Arc::new(NoopSink)
    } else {
        let sink = FileResponseSink::new(&cli.response_log_dir);
        info!(dir = %sink.dir().display(), "Mirroring JIRA responses to disk");
        Arc::new(sink)
    };

    let client = JiraClient::new(source.clone(), sink)?;
    info!(base_url = client.base_url(), %transport, "JIRA client ready");

    let server = JiraToolServer::new(client);
    match transport {
        Transport::Stdio => serve_stdio(server).await,
        Transport::Http => {
            let port = match cli.port {
                Some(port) => port,
                None => parse_http_port(source.get_value(HTTP_PORT_KEY, None).as_deref())?,
            };
            serve_http(server, port).await
        }
    }
}
