//! Path normalization for tool-supplied paths.
//!
//! Agents regularly re-prefix paths with the checkout directory's own name
//! (`repo_3/src/foo.py` instead of `src/foo.py`). The resolver tolerates the
//! redundant segment by stripping it before joining onto the repository root.

use std::path::{Path, PathBuf};

// TODO: a `..` segment in the stripped path still escapes the repository
// root; add a containment check once expected agent path behavior is pinned
// down.

/// Strips a leading `repo_<task_id>/` segment, if present.
///
/// Only the first segment is considered; `src/repo_3/mod.py` is untouched.
pub fn strip_task_prefix<'a>(path: &'a str, task_id: &str) -> &'a str {
    let prefix = format!("repo_{task_id}/");
    path.strip_prefix(prefix.as_str()).unwrap_or(path)
}

/// Resolves a tool-supplied relative path against the repository root.
pub fn resolve(repo_root: &Path, task_id: &str, path: &str) -> PathBuf {
    repo_root.join(strip_task_prefix(path, task_id))
}
