//! Task API client.

use std::time::Duration;

use reqwest::Client;
use tracing::info;

use crate::error::DriverError;

use super::task::TaskCase;

/// Default task API endpoint (SWE-Bench-Lite index service).
pub const DEFAULT_TASK_API: &str = "http://localhost:8081/task/index/";

/// Client for the task index service.
pub struct TaskApi {
    base_url: String,
    http: Client,
}

impl TaskApi {
    /// Creates a client for the given base URL; the task index is appended
    /// per request.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Fetches test case `index`.
    pub async fn fetch(&self, index: usize) -> Result<TaskCase, DriverError> {
        let url = format!("{}{index}", self.base_url);
        info!(%url, "Fetching test case {index}");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(DriverError::TaskApiStatus {
                status: response.status().as_u16(),
                url,
            });
        }
        Ok(response.json::<TaskCase>().await?)
    }
}
