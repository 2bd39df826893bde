//! Agent runtime boundary.
//!
//! The conversation/tool-calling loop lives in an external runtime; the
//! harness only defines the seam it plugs into and the endpoint settings
//! used to point that runtime at a model server.

pub mod endpoint;
pub mod external;

use std::time::Duration;

use async_trait::async_trait;

use crate::sandbox::FileTools;

pub use endpoint::EndpointConfig;
pub use external::ExternalCommandRuntime;

/// Final state reported by a runtime after one task.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// The runtime's final text output.
    pub final_output: String,
    /// Tool invocations the runtime performed, if it counts them.
    pub tool_calls: Option<u32>,
}

impl AgentOutcome {
    /// Creates an outcome carrying only the final output text.
    pub fn new(final_output: impl Into<String>) -> Self {
        Self {
            final_output: final_output.into(),
            tool_calls: None,
        }
    }
}

/// Trait for external agent runtimes.
///
/// The driver hands each runtime a prompt and a [`FileTools`] instance bound
/// to the task's checkout. The runtime issues tool calls sequentially and
/// awaits each result before the next; tool results are always strings, so
/// a runtime never has to handle errors beyond reading the text.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Human-readable runtime name for logs.
    fn name(&self) -> &str;

    /// Runs the agent to completion on one task.
    async fn run(
        &self,
        prompt: &str,
        tools: &mut FileTools,
    ) -> Result<AgentOutcome, AgentError>;
}

/// Error type for agent runtime operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("runtime unavailable: {0}")]
    Unavailable(String),

    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}
