//! Per-task sandbox state.

use std::path::{Path, PathBuf};

use super::guard::ReadGuard;
use super::paths;

/// State binding one repository checkout to a task identifier.
///
/// Created when a task begins and dropped when it ends; nothing here is
/// shared across tasks or persisted.
#[derive(Debug)]
pub struct TaskContext {
    repo_root: PathBuf,
    task_id: String,
    read_guard: ReadGuard,
}

impl TaskContext {
    /// Creates a fresh context for one task.
    pub fn new(repo_root: impl Into<PathBuf>, task_id: impl Into<String>) -> Self {
        Self {
            repo_root: repo_root.into(),
            task_id: task_id.into(),
            read_guard: ReadGuard::new(),
        }
    }

    /// The repository checkout this context is bound to.
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// The task identifier, as used in the `repo_<task_id>` directory name.
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Normalizes a tool-supplied path to a repo-relative string.
    pub fn normalize<'a>(&self, path: &'a str) -> &'a str {
        paths::strip_task_prefix(path, &self.task_id)
    }

    /// Resolves a tool-supplied path to an absolute path under the root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        paths::resolve(&self.repo_root, &self.task_id, path)
    }

    pub(crate) fn guard_mut(&mut self) -> &mut ReadGuard {
        &mut self.read_guard
    }

    /// Read attempts recorded for a normalized relative path.
    pub fn read_attempts(&self, path: &str) -> u32 {
        self.read_guard.attempts(self.normalize(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_and_resolve_agree() {
        let ctx = TaskContext::new("/work/repos/repo_5", "5");
        assert_eq!(ctx.normalize("repo_5/src/app.py"), "src/app.py");
        assert_eq!(
            ctx.resolve("repo_5/src/app.py"),
            PathBuf::from("/work/repos/repo_5/src/app.py"),
        );
    }

    #[test]
    fn contexts_have_independent_guards() {
        let mut a = TaskContext::new("/tmp/a", "1");
        let mut b = TaskContext::new("/tmp/b", "2");
        for _ in 0..5 {
            let _ = a.guard_mut().register("x.py");
        }
        assert!(b.guard_mut().register("x.py").is_ok());
        assert_eq!(b.read_attempts("x.py"), 1);
    }
}
