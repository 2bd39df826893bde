//! Append-only results log.
//!
//! One section per test case, in the shape operators grep for when
//! comparing runs across models.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::DriverError;

use super::eval::TestsStatus;

/// Default results log file name.
pub const DEFAULT_RESULTS_LOG: &str = "results.log";

/// Writer for the per-testcase results log.
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    /// Creates a writer appending to `path`; the file is created on first
    /// record.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the outcome of an evaluated test case.
    pub fn record_evaluated(
        &self,
        index: usize,
        status: &TestsStatus,
        token_total: &str,
    ) -> Result<(), DriverError> {
        self.append(
            index,
            &[
                format!(
                    "FAIL_TO_PASS passed: {}/{}",
                    status.fail_to_pass.passed(),
                    status.fail_to_pass.total()
                ),
                format!(
                    "PASS_TO_PASS passed: {}/{}",
                    status.pass_to_pass.passed(),
                    status.pass_to_pass.total()
                ),
                format!("Total Tokens Used: {token_total}"),
            ],
        )
    }

    /// Appends a skip notice for a run that produced no changes.
    pub fn record_no_changes(&self, index: usize, token_total: &str) -> Result<(), DriverError> {
        self.append(
            index,
            &[
                "No changes detected in the repository. Skipping evaluation.".to_string(),
                format!("Total Tokens Used: {token_total}"),
            ],
        )
    }

    /// Appends the failure of a test case that aborted.
    pub fn record_error(&self, index: usize, message: &str) -> Result<(), DriverError> {
        self.append(index, &[format!("Error: {message}")])
    }

    fn append(&self, index: usize, lines: &[String]) -> Result<(), DriverError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "\n--- TESTCASE {index} ---")?;
        for line in lines {
            writeln!(file, "{line}")?;
        }
        Ok(())
    }
}
