//! Sandboxed file-tool layer handed to the agent runtime.
//!
//! # Architecture
//!
//! ```text
//! TaskDriver → TaskContext + FileTools → AgentRuntime → tool calls → working tree
//! ```
//!
//! The driver binds a [`TaskContext`] to one repository checkout, wraps it in
//! a [`FileTools`] instance and hands that to the agent runtime. The runtime
//! calls tools zero or more times; afterwards the driver inspects the
//! resulting working tree. Three pieces of control logic live here:
//!
//! - path normalization that tolerates agents re-prefixing paths with the
//!   checkout directory's own name ([`paths`])
//! - a read-count circuit breaker that stops runaway re-reading loops
//!   ([`guard`])
//! - error surfacing: every failure becomes a textual tool result, because
//!   an exception escaping to the runtime would abort the whole task
//!   ([`tools`])

pub mod context;
pub mod guard;
pub mod paths;
pub mod tools;

pub use context::TaskContext;
pub use guard::{ReadGuard, MAX_READS_PER_FILE};
pub use tools::{FileTools, ToolConfig, DEFAULT_TEST_RUNNER, DEFAULT_TEST_TIMEOUT};
