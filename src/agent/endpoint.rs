//! Model endpoint selection.
//!
//! Agent runtimes speak the OpenAI-compatible chat completions API, so any
//! server exposing it can back a run: a local Ollama instance by default, or
//! a hosted proxy by overriding three environment variables. The harness
//! never talks to the model itself; it only forwards these settings to the
//! runtime.

use std::env;

use serde::{Deserialize, Serialize};

/// Environment variable naming the OpenAI-compatible base URL.
pub const BASE_URL_VAR: &str = "HARNESS_BASE_URL";
/// Environment variable naming the API key.
pub const API_KEY_VAR: &str = "HARNESS_API_KEY";
/// Environment variable naming the model.
pub const MODEL_VAR: &str = "HARNESS_MODEL";

const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";
const DEFAULT_API_KEY: &str = "ollama";
const DEFAULT_MODEL: &str = "gemma3:1b";

/// Connection settings for the model server backing the agent runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the chat completions server.
    pub base_url: String,
    /// API key; local servers accept any placeholder.
    pub api_key: String,
    /// Model name as known to the server.
    pub model: String,
}

impl EndpointConfig {
    /// Creates an explicit endpoint configuration.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Reads the endpoint from the environment, falling back to a local
    /// Ollama server.
    pub fn from_env() -> Self {
        Self {
            base_url: env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: env::var(API_KEY_VAR).unwrap_or_else(|_| DEFAULT_API_KEY.to_string()),
            model: env::var(MODEL_VAR).unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_API_KEY, DEFAULT_MODEL)
    }
}
