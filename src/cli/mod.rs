//! Command-line interface for swe-harness.
//!
//! Provides the `run` command for driving ranges of benchmark tasks
//! against an agent runtime.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli, Commands, RunArgs};
