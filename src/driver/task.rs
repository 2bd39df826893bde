//! Task metadata served by the task API.

use serde::{Deserialize, Serialize};

use crate::error::DriverError;

/// One SWE-Bench-style test case as served by the task index service.
///
/// Field names follow the service's JSON verbatim; the test lists arrive as
/// JSON-encoded strings and are parsed leniently to empty lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCase {
    /// Problem statement shown to the agent.
    #[serde(rename = "Problem_statement")]
    pub problem_statement: String,

    /// Combined `git clone <url> && git checkout <commit>` command line.
    pub git_clone: String,

    /// JSON-encoded list of tests expected to flip from fail to pass.
    #[serde(rename = "FAIL_TO_PASS", default)]
    pub fail_to_pass: Option<String>,

    /// JSON-encoded list of tests that must keep passing.
    #[serde(rename = "PASS_TO_PASS", default)]
    pub pass_to_pass: Option<String>,

    /// Stable benchmark instance identifier.
    pub instance_id: String,
}

impl TaskCase {
    /// Tests expected to flip from failing to passing.
    pub fn fail_tests(&self) -> Vec<String> {
        parse_test_list(self.fail_to_pass.as_deref())
    }

    /// Regression tests that must keep passing.
    pub fn pass_tests(&self) -> Vec<String> {
        parse_test_list(self.pass_to_pass.as_deref())
    }

    /// Splits the `git_clone` field into repository URL and optional commit.
    pub fn clone_spec(&self) -> Result<CloneSpec, DriverError> {
        parse_git_clone(&self.git_clone)
    }
}

/// Repository URL and optional commit parsed from a task's `git_clone` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneSpec {
    /// Repository clone URL.
    pub repo_url: String,
    /// Commit to check out after cloning, when the task pins one.
    pub commit: Option<String>,
}

fn parse_test_list(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

/// Parses `git clone <url> [&& git checkout <commit>]`.
///
/// The URL is the third token of the clone part; the commit is the last
/// token of the last `&&` part, when more than one part is present.
fn parse_git_clone(raw: &str) -> Result<CloneSpec, DriverError> {
    let parts: Vec<&str> = raw.split("&&").collect();
    let clone_part = parts[0].trim();

    let repo_url = clone_part
        .split_whitespace()
        .nth(2)
        .ok_or_else(|| DriverError::Task(format!("unparseable git_clone command: {raw}")))?
        .to_string();

    let commit = if parts.len() > 1 {
        parts
            .last()
            .and_then(|part| part.trim().split_whitespace().last())
            .map(String::from)
    } else {
        None
    };

    Ok(CloneSpec { repo_url, commit })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(git_clone: &str, fail: Option<&str>, pass: Option<&str>) -> TaskCase {
        TaskCase {
            problem_statement: "The widget crashes.".to_string(),
            git_clone: git_clone.to_string(),
            fail_to_pass: fail.map(String::from),
            pass_to_pass: pass.map(String::from),
            instance_id: "proj__proj-1234".to_string(),
        }
    }

    #[test]
    fn parses_clone_with_checkout() {
        let spec = task(
            "git clone https://github.com/org/proj.git && git checkout abc123",
            None,
            None,
        )
        .clone_spec()
        .unwrap();
        assert_eq!(spec.repo_url, "https://github.com/org/proj.git");
        assert_eq!(spec.commit.as_deref(), Some("abc123"));
    }

    #[test]
    fn parses_clone_without_checkout() {
        let spec = task("git clone https://github.com/org/proj.git", None, None)
            .clone_spec()
            .unwrap();
        assert_eq!(spec.repo_url, "https://github.com/org/proj.git");
        assert_eq!(spec.commit, None);
    }

    #[test]
    fn rejects_truncated_clone_command() {
        assert!(task("git clone", None, None).clone_spec().is_err());
    }

    #[test]
    fn test_lists_parse_leniently() {
        let t = task(
            "git clone https://github.com/org/proj.git",
            Some(r#"["tests/test_a.py::test_x", "tests/test_b.py"]"#),
            Some("not json"),
        );
        assert_eq!(
            t.fail_tests(),
            vec!["tests/test_a.py::test_x".to_string(), "tests/test_b.py".to_string()],
        );
        assert!(t.pass_tests().is_empty());

        let missing = task("git clone https://github.com/org/proj.git", None, None);
        assert!(missing.fail_tests().is_empty());
    }

    #[test]
    fn deserializes_service_json() {
        let json = r#"{
            "Problem_statement": "Fix the off-by-one.",
            "git_clone": "git clone https://github.com/org/proj.git && git checkout deadbeef",
            "FAIL_TO_PASS": "[\"tests/test_core.py::test_edge\"]",
            "PASS_TO_PASS": "[]",
            "instance_id": "org__proj-1"
        }"#;
        let t: TaskCase = serde_json::from_str(json).unwrap();
        assert_eq!(t.instance_id, "org__proj-1");
        assert_eq!(t.fail_tests().len(), 1);
        assert_eq!(t.clone_spec().unwrap().commit.as_deref(), Some("deadbeef"));
    }
}
