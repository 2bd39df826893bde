//! Error types for harness operations.
//!
//! Defines error types for the two major subsystems:
//! - Sandbox file tools exposed to the agent runtime
//! - Task driving (fetch, checkout, agent invocation, evaluation, reporting)

use std::time::Duration;

use thiserror::Error;

use crate::agent::AgentError;

/// Errors produced by sandbox tool operations.
///
/// These never cross the tool boundary as errors: the tool set renders them
/// into `Error: ...` strings because the calling agent runtime only
/// understands text tool outputs.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("file or directory not found: {0}")]
    NotFound(String),

    #[error("binary file: {0} is not valid UTF-8 text")]
    BinaryContent(String),

    #[error("too many reads of {path}: {count} attempts exceed the limit of {limit}")]
    LoopGuardTripped { path: String, count: u32, limit: u32 },

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("test run failed: {0}")]
    TestRunFailure(String),

    #[error("test run timed out after {0:?}")]
    TestRunTimeout(Duration),
}

/// Errors that can occur while driving a task end to end.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("unexpected status {status} from task API at {url}")]
    TaskApiStatus { status: u16, url: String },

    #[error("malformed task metadata: {0}")]
    Task(String),

    #[error("git {op} failed with exit code {code}: {stderr}")]
    Git {
        op: String,
        code: i32,
        stderr: String,
    },

    #[error("agent runtime error: {0}")]
    Agent(#[from] AgentError),

    #[error("evaluation service error: {0}")]
    Eval(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
