//! Task driver: end-to-end handling of one SWE-Bench test case.
//!
//! # Architecture
//!
//! ```text
//! Task API → clone/checkout → AgentRuntime (with FileTools) → git diff
//!                                                                │
//!                     results.log ← evaluation service ←─────────┘
//! ```
//!
//! The driver fetches a task, checks out its repository, hands the agent
//! runtime a sandboxed tool set bound to that checkout, and then inspects
//! the working tree. A clean tree skips evaluation; a dirty one is
//! forwarded to the evaluation service. Every outcome, including aborts,
//! lands in the results log so a batch run never stops on one bad task.

pub mod eval;
pub mod fetch;
pub mod repo;
pub mod report;
pub mod task;
pub mod usage;

pub use eval::{EvalClient, EvalRequest, GroupStatus, TestsStatus, DEFAULT_EVAL_API};
pub use fetch::{TaskApi, DEFAULT_TASK_API};
pub use report::{ResultsLog, DEFAULT_RESULTS_LOG};
pub use task::{CloneSpec, TaskCase};
pub use usage::{extract_last_token_total, TokenTotal};

use std::path::PathBuf;

use tracing::{error, info};
use uuid::Uuid;

use crate::agent::AgentRuntime;
use crate::error::DriverError;
use crate::sandbox::{FileTools, TaskContext, ToolConfig};

/// Configuration for the task driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Base URL of the task index service.
    pub task_api: String,
    /// URL of the evaluation service.
    pub eval_api: String,
    /// Workspace root; checkouts land under `<workspace>/repos`.
    pub workspace: PathBuf,
    /// Results log path.
    pub results_log: PathBuf,
    /// Directory scanned for runtime token logs.
    pub logs_dir: PathBuf,
    /// Tool configuration handed to each task's sandbox.
    pub tools: ToolConfig,
}

impl DriverConfig {
    /// Creates a configuration with the default local service endpoints.
    pub fn new() -> Self {
        Self {
            task_api: DEFAULT_TASK_API.to_string(),
            eval_api: DEFAULT_EVAL_API.to_string(),
            workspace: PathBuf::from("./workspace"),
            results_log: PathBuf::from(DEFAULT_RESULTS_LOG),
            logs_dir: PathBuf::from("./logs"),
            tools: ToolConfig::default(),
        }
    }

    /// Sets the task API base URL.
    pub fn with_task_api(mut self, url: impl Into<String>) -> Self {
        self.task_api = url.into();
        self
    }

    /// Sets the evaluation service URL.
    pub fn with_eval_api(mut self, url: impl Into<String>) -> Self {
        self.eval_api = url.into();
        self
    }

    /// Sets the workspace root.
    pub fn with_workspace(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workspace = dir.into();
        self
    }

    /// Sets the results log path.
    pub fn with_results_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_log = path.into();
        self
    }

    /// Sets the runtime log directory scanned for token totals.
    pub fn with_logs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.logs_dir = dir.into();
        self
    }

    /// Sets the sandbox tool configuration.
    pub fn with_tools(mut self, tools: ToolConfig) -> Self {
        self.tools = tools;
        self
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives tasks end to end against an external agent runtime.
pub struct TaskDriver {
    config: DriverConfig,
    runtime: Box<dyn AgentRuntime>,
    tasks: TaskApi,
    eval: EvalClient,
    log: ResultsLog,
}

impl TaskDriver {
    /// Creates a driver for the given configuration and runtime.
    pub fn new(config: DriverConfig, runtime: Box<dyn AgentRuntime>) -> Self {
        let tasks = TaskApi::new(&config.task_api);
        let eval = EvalClient::new(&config.eval_api);
        let log = ResultsLog::new(&config.results_log);
        Self {
            config,
            runtime,
            tasks,
            eval,
            log,
        }
    }

    /// Handles a range of task indices sequentially, recording every
    /// outcome; a failed task is logged and the batch moves on.
    pub async fn run_range(&self, start: usize, end: usize) -> Result<(), DriverError> {
        for index in start..=end {
            if let Err(e) = self.handle_task(index).await {
                error!(index, error = %e, "Task failed");
                self.log.record_error(index, &e.to_string())?;
            }
        }
        Ok(())
    }

    /// Handles one test case end to end.
    pub async fn handle_task(&self, index: usize) -> Result<(), DriverError> {
        let run_id = format!("run-{}", Uuid::new_v4());
        info!(index, %run_id, "Handling test case");

        let task = self.tasks.fetch(index).await?;
        let spec = task.clone_spec()?;

        let repo_dir = self.repo_dir(index);
        repo::clone_repo(&spec.repo_url, &repo_dir).await?;
        if let Some(commit) = &spec.commit {
            repo::checkout(&repo_dir, commit).await?;
        }

        let prompt = build_prompt(index, &task.problem_statement);
        info!(runtime = self.runtime.name(), "Launching agent");

        let ctx = TaskContext::new(&repo_dir, index.to_string());
        let mut tools = FileTools::new(ctx).with_config(self.config.tools.clone());
        let outcome = self.runtime.run(&prompt, &mut tools).await?;
        info!(final_output = %outcome.final_output, "Agent finished");

        let token_total = usage::extract_last_token_total(&self.config.logs_dir);

        info!("Checking for changes in the repository");
        if !repo::has_changes(&repo_dir).await? {
            info!("No changes detected in the repository. Skipping evaluation.");
            self.log
                .record_no_changes(index, &token_total.to_string())?;
            return Ok(());
        }
        info!("Changes detected in the repository. Proceeding with evaluation.");

        let request = EvalRequest {
            instance_id: task.instance_id.clone(),
            // The evaluation service mounts the workspace at /repos.
            repo_dir: format!("/repos/repo_{index}"),
            fail_to_pass: task.fail_tests(),
            pass_to_pass: task.pass_tests(),
        };
        let status = self.eval.evaluate(&request).await?;
        self.log
            .record_evaluated(index, &status, &token_total.to_string())?;
        info!(index, "Test case completed and logged");
        Ok(())
    }

    /// Host-side checkout directory for a task.
    pub fn repo_dir(&self, index: usize) -> PathBuf {
        self.config
            .workspace
            .join("repos")
            .join(format!("repo_{index}"))
    }
}

/// Builds the planner/coder/tester prompt around the problem statement.
fn build_prompt(index: usize, problem: &str) -> String {
    format!(
        "You are a team of agents with the following roles:\n\
         - Planner: breaks down the problem into coding tasks\n\
         - Coder: makes actual changes to the code files in the Git repository\n\
         - Tester: runs the test suite and checks whether the bug is resolved\n\n\
         Work in the directory: repo_{index}. This is a Git repository.\n\
         Your goal is to fix the problem described below.\n\
         All code changes must be saved to the files, so they appear in `git diff`.\n\
         The fix will be verified by running the affected tests.\n\n\
         Problem description:\n\
         {problem}\n\n\
         Make sure the fix is minimal and only touches what's necessary to resolve the failing tests."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentError, AgentOutcome};
    use async_trait::async_trait;

    struct NullRuntime;

    #[async_trait]
    impl AgentRuntime for NullRuntime {
        fn name(&self) -> &str {
            "null"
        }

        async fn run(
            &self,
            _prompt: &str,
            _tools: &mut FileTools,
        ) -> Result<AgentOutcome, AgentError> {
            Ok(AgentOutcome::new(""))
        }
    }

    #[test]
    fn prompt_pins_the_task_directory() {
        let prompt = build_prompt(7, "The parser drops trailing newlines.");
        assert!(prompt.contains("Work in the directory: repo_7."));
        assert!(prompt.contains("The parser drops trailing newlines."));
        assert!(prompt.contains("git diff"));
    }

    #[test]
    fn checkouts_live_under_workspace_repos() {
        let config = DriverConfig::new().with_workspace("/data/ws");
        let driver = TaskDriver::new(config, Box::new(NullRuntime));
        assert_eq!(driver.repo_dir(3), PathBuf::from("/data/ws/repos/repo_3"));
    }

    #[test]
    fn config_builders_compose() {
        let config = DriverConfig::new()
            .with_task_api("http://tasks:8081/task/index/")
            .with_eval_api("http://eval:8082/test")
            .with_results_log("/tmp/out.log")
            .with_logs_dir("/tmp/logs");
        assert_eq!(config.task_api, "http://tasks:8081/task/index/");
        assert_eq!(config.eval_api, "http://eval:8082/test");
        assert_eq!(config.results_log, PathBuf::from("/tmp/out.log"));
        assert_eq!(config.logs_dir, PathBuf::from("/tmp/logs"));
    }
}
