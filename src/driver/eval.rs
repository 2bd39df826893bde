//! Evaluation service client.
//!
//! After the agent leaves changes in the working tree, the harness forwards
//! the checkout to an external SWE-Bench evaluation service and reads back
//! per-test pass/fail status.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::DriverError;

/// Default evaluation service endpoint.
pub const DEFAULT_EVAL_API: &str = "http://localhost:8082/test";

/// Payload sent to the evaluation service.
#[derive(Debug, Clone, Serialize)]
pub struct EvalRequest {
    /// Benchmark instance identifier.
    pub instance_id: String,
    /// Container-side path of the checkout (the service mounts `/repos`).
    #[serde(rename = "repoDir")]
    pub repo_dir: String,
    /// Tests expected to flip from fail to pass.
    #[serde(rename = "FAIL_TO_PASS")]
    pub fail_to_pass: Vec<String>,
    /// Regression tests that must keep passing.
    #[serde(rename = "PASS_TO_PASS")]
    pub pass_to_pass: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EvalResponse {
    /// JSON-encoded per-instance report, nested as a string.
    #[serde(rename = "harnessOutput", default)]
    harness_output: String,
}

/// Success/failure split for one test group.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupStatus {
    #[serde(default)]
    pub success: Vec<String>,
    #[serde(default)]
    pub failure: Vec<String>,
}

impl GroupStatus {
    /// Total number of tests in the group.
    pub fn total(&self) -> usize {
        self.success.len() + self.failure.len()
    }

    /// Number of passing tests in the group.
    pub fn passed(&self) -> usize {
        self.success.len()
    }
}

/// Per-group test status for one evaluated instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestsStatus {
    #[serde(rename = "FAIL_TO_PASS", default)]
    pub fail_to_pass: GroupStatus,
    #[serde(rename = "PASS_TO_PASS", default)]
    pub pass_to_pass: GroupStatus,
}

#[derive(Debug, Deserialize)]
struct InstanceReport {
    tests_status: TestsStatus,
}

/// Client for the evaluation REST service.
pub struct EvalClient {
    url: String,
    http: Client,
}

impl EvalClient {
    /// Creates a client for the given service URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            // Evaluation replays whole test suites; allow it time.
            http: Client::builder()
                .timeout(Duration::from_secs(600))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Submits a checkout for evaluation and returns the parsed test status.
    pub async fn evaluate(&self, request: &EvalRequest) -> Result<TestsStatus, DriverError> {
        info!(instance_id = %request.instance_id, "Submitting evaluation request");

        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        let body: EvalResponse = response.json().await?;
        parse_harness_output(&body.harness_output)
    }
}

/// Parses the `harnessOutput` JSON string: a map keyed by instance id whose
/// first entry carries the `tests_status`.
fn parse_harness_output(raw: &str) -> Result<TestsStatus, DriverError> {
    if raw.trim().is_empty() {
        return Err(DriverError::Eval(
            "no data in harnessOutput, possible evaluation error or empty result".to_string(),
        ));
    }
    let reports: HashMap<String, InstanceReport> = serde_json::from_str(raw)?;
    let report = reports.into_values().next().ok_or_else(|| {
        DriverError::Eval(
            "no data in harnessOutput, possible evaluation error or empty result".to_string(),
        )
    })?;
    Ok(report.tests_status)
}
