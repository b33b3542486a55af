//! JIRA MCP server library.
//!
//! Exposes a read-only set of JIRA operations (fetch an issue, JQL search,
//! list projects and issue types) as Model Context Protocol tools.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;
