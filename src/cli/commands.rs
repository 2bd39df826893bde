//! CLI command definitions for swe-harness.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::agent::external::DEFAULT_AGENT_TIMEOUT;
use crate::agent::{EndpointConfig, ExternalCommandRuntime};
use crate::driver::{DriverConfig, TaskDriver, DEFAULT_EVAL_API, DEFAULT_RESULTS_LOG, DEFAULT_TASK_API};
use crate::sandbox::ToolConfig;

/// SWE-Bench experimentation harness for LLM coding agents.
#[derive(Parser)]
#[command(name = "swe-harness")]
#[command(about = "Drive an LLM coding agent against SWE-Bench-style tasks")]
#[command(version)]
#[command(
    long_about = "swe-harness fetches SWE-Bench-style tasks from a task index service, checks out \
each referenced repository, lets an agent runtime produce a fix through sandboxed file tools, and \
forwards changed checkouts to an evaluation service.\n\nExample usage:\n  swe-harness run --start 1 --end 5 --agent-cmd 'my-agent'"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the harness over a range of task indices.
    Run(RunArgs),
}

/// Arguments for `swe-harness run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// First task index (inclusive).
    #[arg(long, default_value = "1")]
    pub start: usize,

    /// Last task index (inclusive).
    #[arg(long, default_value = "1")]
    pub end: usize,

    /// Base URL of the task index service.
    #[arg(long, env = "HARNESS_TASK_API", default_value = DEFAULT_TASK_API)]
    pub task_api: String,

    /// URL of the evaluation service.
    #[arg(long, env = "HARNESS_EVAL_API", default_value = DEFAULT_EVAL_API)]
    pub eval_api: String,

    /// Workspace directory; repository checkouts land under <WORKSPACE>/repos.
    #[arg(long, default_value = "./workspace")]
    pub workspace: PathBuf,

    /// Results log file, appended across runs.
    #[arg(long, default_value = DEFAULT_RESULTS_LOG)]
    pub results_log: PathBuf,

    /// Directory scanned for agent runtime logs (token accounting).
    #[arg(long, default_value = "./logs")]
    pub logs_dir: PathBuf,

    /// Agent runtime command; receives the prompt on stdin and the endpoint
    /// via environment variables.
    #[arg(long, default_value = "agent")]
    pub agent_cmd: String,

    /// Wall-clock limit for one agent run, in seconds.
    #[arg(long, default_value_t = DEFAULT_AGENT_TIMEOUT.as_secs())]
    pub agent_timeout: u64,

    /// Wall-clock limit for one test invocation, in seconds.
    #[arg(long, default_value = "120")]
    pub test_timeout: u64,

    /// OpenAI-compatible base URL for the model endpoint.
    #[arg(long, env = "HARNESS_BASE_URL")]
    pub base_url: Option<String>,

    /// API key for the model endpoint.
    #[arg(long, env = "HARNESS_API_KEY")]
    pub api_key: Option<String>,

    /// Model name as known to the endpoint.
    #[arg(long, env = "HARNESS_MODEL")]
    pub model: Option<String>,
}

/// Parses CLI arguments from the process environment.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Runs the CLI with pre-parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_harness(args).await,
    }
}

async fn run_harness(args: RunArgs) -> anyhow::Result<()> {
    let mut endpoint = EndpointConfig::default();
    if let Some(base_url) = args.base_url {
        endpoint.base_url = base_url;
    }
    if let Some(api_key) = args.api_key {
        endpoint.api_key = api_key;
    }
    if let Some(model) = args.model {
        endpoint.model = model;
    }
    info!(base_url = %endpoint.base_url, model = %endpoint.model, "Using model endpoint");

    let agent_parts: Vec<String> = args.agent_cmd.split_whitespace().map(String::from).collect();
    let (agent_program, agent_args) = match agent_parts.split_first() {
        Some((program, rest)) => (program.clone(), rest.to_vec()),
        None => anyhow::bail!("--agent-cmd must not be empty"),
    };
    let runtime = ExternalCommandRuntime::new(agent_program)
        .with_args(agent_args)
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(args.agent_timeout));

    let tools = ToolConfig::default().with_test_timeout(Duration::from_secs(args.test_timeout));
    let config = DriverConfig::new()
        .with_task_api(args.task_api)
        .with_eval_api(args.eval_api)
        .with_workspace(args.workspace)
        .with_results_log(args.results_log)
        .with_logs_dir(args.logs_dir)
        .with_tools(tools);

    let driver = TaskDriver::new(config, Box::new(runtime));
    driver.run_range(args.start, args.end).await?;
    Ok(())
}
