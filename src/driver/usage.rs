//! Token usage extraction from runtime log files.
//!
//! The agent runtime writes its own session logs; the only usable counter
//! is the `Cumulative Total=<n>` line appended per request. Scanning for it
//! is inherently log-format-dependent, so absence is reported as a value
//! rather than an error and the rest of the run is unaffected.

use std::path::Path;

use regex::Regex;
use tracing::debug;

/// Token total recovered from runtime logs, or why it wasn't.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenTotal {
    /// Cumulative token count from the newest log.
    Tokens(u64),
    /// The log directory is missing or holds no `.log` files.
    NoLogs,
    /// The newest log never mentions a cumulative total.
    MarkerNotFound,
}

impl std::fmt::Display for TokenTotal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tokens(n) => write!(f, "{n}"),
            Self::NoLogs => write!(f, "No logs found"),
            Self::MarkerNotFound => write!(f, "Cumulative Total not found"),
        }
    }
}

/// Scans the newest `.log` file in `log_dir` for the last cumulative total.
pub fn extract_last_token_total(log_dir: &Path) -> TokenTotal {
    let mut log_files: Vec<_> = match std::fs::read_dir(log_dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|ext| ext == "log").unwrap_or(false))
            .collect(),
        Err(_) => return TokenTotal::NoLogs,
    };
    if log_files.is_empty() {
        return TokenTotal::NoLogs;
    }

    // Newest session logs sort last by name.
    log_files.sort();
    let latest = &log_files[log_files.len() - 1];

    let content = match std::fs::read_to_string(latest) {
        Ok(content) => content,
        Err(_) => return TokenTotal::NoLogs,
    };

    let re = Regex::new(r"Cumulative Total=(\d+)").expect("Invalid token total regex");
    let last = re
        .captures_iter(&content)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok());

    match last {
        Some(total) => {
            debug!(log = %latest.display(), total, "Recovered token total");
            TokenTotal::Tokens(total)
        }
        None => TokenTotal::MarkerNotFound,
    }
}
