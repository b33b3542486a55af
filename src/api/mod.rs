//! JIRA API client and types.
//!
//! This module provides the interface for communicating with the JIRA REST API.

mod auth;
mod client;
pub mod error;
pub mod jql;
pub mod sink;
pub mod types;

pub use auth::Auth;
pub use client::{JiraClient, RequestMethod};
pub use error::{ApiError, JiraError};
pub use sink::{FileResponseSink, NoopSink, ResponseSink};
pub use types::{Issue, IssueType, Project, SearchParams, SearchResponse};
