//! External command runtime adapter.
//!
//! Runs any command-line agent runtime as a subprocess in the task's
//! checkout: the prompt goes in via stdin, the model endpoint via
//! environment variables, and the final output comes back on stdout. Such a
//! runtime brings its own tool loop; the in-process [`FileTools`] stay
//! available for runtimes embedded in the harness process.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::sandbox::FileTools;

use super::{AgentError, AgentOutcome, AgentRuntime, EndpointConfig};

/// Default wall-clock limit for one agent run.
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(600);

/// Adapter for CLI-based agent runtimes.
pub struct ExternalCommandRuntime {
    /// Command to run.
    command: String,
    /// Extra arguments placed before the prompt handling.
    args: Vec<String>,
    /// Endpoint settings exported to the child process.
    endpoint: EndpointConfig,
    /// Wall-clock limit for one run.
    timeout: Duration,
}

impl ExternalCommandRuntime {
    /// Creates an adapter for the given command with default settings.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            endpoint: EndpointConfig::default(),
            timeout: DEFAULT_AGENT_TIMEOUT,
        }
    }

    /// Adds fixed arguments to the command line.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Sets the endpoint exported to the child.
    pub fn with_endpoint(mut self, endpoint: EndpointConfig) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the run timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl AgentRuntime for ExternalCommandRuntime {
    fn name(&self) -> &str {
        &self.command
    }

    async fn run(
        &self,
        prompt: &str,
        tools: &mut FileTools,
    ) -> Result<AgentOutcome, AgentError> {
        let working_dir = tools.context().repo_root().to_path_buf();

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .current_dir(&working_dir)
            .env(super::endpoint::BASE_URL_VAR, &self.endpoint.base_url)
            .env(super::endpoint::API_KEY_VAR, &self.endpoint.api_key)
            .env(super::endpoint::MODEL_VAR, &self.endpoint.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        info!(
            command = %self.command,
            working_dir = %working_dir.display(),
            model = %self.endpoint.model,
            "Starting external agent runtime"
        );

        let mut child = cmd.spawn().map_err(|e| {
            AgentError::Unavailable(format!("failed to spawn {}: {e}", self.command))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| AgentError::ExecutionFailed(format!("failed to write prompt: {e}")))?;
            stdin.shutdown().await.ok();
        }

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(AgentError::ExecutionFailed(format!("process error: {e}")));
            }
            // Dropping the future reaps the child via kill_on_drop.
            Err(_) => return Err(AgentError::Timeout(self.timeout)),
        };

        let exit_code = output.status.code().unwrap_or(-1);
        debug!(exit_code, "External agent runtime finished");

        if !output.status.success() {
            return Err(AgentError::ExecutionFailed(format!(
                "agent exited with code {exit_code}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(AgentOutcome::new(
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
        ))
    }
}
