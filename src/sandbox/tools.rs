//! File tools exposed to the agent runtime.
//!
//! Every operation resolves to a plain string: the calling runtime only
//! understands text tool outputs, so failures are rendered with an
//! `Error: ` prefix instead of being raised. Internally each tool works
//! with [`ToolError`] and serializes at the boundary.

use std::fs;
use std::process::Stdio;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ToolError;

use super::context::TaskContext;

/// Default wall-clock limit for one test invocation.
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Default test runner argv; `-xvs` and the test paths are appended.
pub const DEFAULT_TEST_RUNNER: &[&str] = &["python", "-m", "pytest"];

/// Configuration for the tool set.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Test runner command, run from the repository root.
    pub test_runner: Vec<String>,
    /// Wall-clock limit for one test invocation.
    pub test_timeout: Duration,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            test_runner: DEFAULT_TEST_RUNNER.iter().map(|s| s.to_string()).collect(),
            test_timeout: DEFAULT_TEST_TIMEOUT,
        }
    }
}

impl ToolConfig {
    /// Sets the test runner command.
    pub fn with_test_runner(mut self, runner: Vec<String>) -> Self {
        self.test_runner = runner;
        self
    }

    /// Sets the test timeout.
    pub fn with_test_timeout(mut self, timeout: Duration) -> Self {
        self.test_timeout = timeout;
        self
    }
}

/// The tool set handed to the agent runtime for one task.
///
/// The runtime issues calls sequentially and awaits each result before the
/// next; there is no concurrent tool invocation within one task.
pub struct FileTools {
    ctx: TaskContext,
    config: ToolConfig,
}

impl FileTools {
    /// Creates a tool set bound to a task context, with default config.
    pub fn new(ctx: TaskContext) -> Self {
        Self {
            ctx,
            config: ToolConfig::default(),
        }
    }

    /// Replaces the tool configuration.
    pub fn with_config(mut self, config: ToolConfig) -> Self {
        self.config = config;
        self
    }

    /// The task context this tool set is bound to.
    pub fn context(&self) -> &TaskContext {
        &self.ctx
    }

    /// Reads the contents of a file.
    ///
    /// Returns the file text, or an `Error: ` string when the file is
    /// missing, not valid UTF-8, unreadable, or read too many times.
    pub fn read_file(&mut self, file_path: &str) -> String {
        render(self.try_read_file(file_path))
    }

    fn try_read_file(&mut self, file_path: &str) -> Result<String, ToolError> {
        let rel = self.ctx.normalize(file_path).to_string();
        // Count the attempt before touching the filesystem: refused and
        // failed reads both feed the loop breaker.
        self.ctx.guard_mut().register(&rel)?;

        let full = self.ctx.resolve(file_path);
        let bytes = match fs::read(&full) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolError::NotFound(rel));
            }
            Err(e) => return Err(ToolError::Io { path: rel, source: e }),
        };
        let content =
            String::from_utf8(bytes).map_err(|_| ToolError::BinaryContent(rel.clone()))?;
        debug!(path = %rel, bytes = content.len(), "read_file succeeded");
        Ok(content)
    }

    /// Writes content to a file, creating missing parent directories.
    ///
    /// Fully overwrites the target; a crash mid-write may leave a truncated
    /// file. Returns a confirmation, or an `Error: ` string on failure.
    pub fn write_file(&self, file_path: &str, content: &str) -> String {
        render(self.try_write_file(file_path, content))
    }

    fn try_write_file(&self, file_path: &str, content: &str) -> Result<String, ToolError> {
        let rel = self.ctx.normalize(file_path).to_string();
        let full = self.ctx.resolve(file_path);

        let result = (|| {
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&full, content)
        })();

        match result {
            Ok(()) => {
                debug!(path = %rel, bytes = content.len(), "write_file succeeded");
                Ok(format!("File {file_path} written successfully"))
            }
            Err(e) => {
                warn!(path = %rel, error = %e, "write_file failed");
                Err(ToolError::Io { path: rel, source: e })
            }
        }
    }

    /// Lists a directory, non-recursively.
    ///
    /// Entries are relative names tagged `dir` or `file`, one per line,
    /// sorted lexicographically by name. An empty `directory_path` lists the
    /// repository root.
    pub fn list_files(&self, directory_path: &str) -> String {
        render(self.try_list_files(directory_path))
    }

    fn try_list_files(&self, directory_path: &str) -> Result<String, ToolError> {
        let dir = if directory_path.is_empty() { "." } else { directory_path };
        let rel = self.ctx.normalize(dir).to_string();
        let full = self.ctx.resolve(dir);

        let entries = match fs::read_dir(&full) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolError::NotFound(rel));
            }
            Err(e) => return Err(ToolError::Io { path: rel, source: e }),
        };

        let mut listed = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ToolError::Io {
                path: rel.clone(),
                source: e,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            listed.push((name, if is_dir { "dir" } else { "file" }));
        }
        listed.sort_by(|a, b| a.0.cmp(&b.0));

        debug!(path = %rel, entries = listed.len(), "list_files succeeded");
        Ok(listed
            .iter()
            .map(|(name, kind)| format!("{kind} {name}"))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Runs the configured test runner on a space-separated list of test
    /// identifiers, from the repository root.
    ///
    /// Returns a report of exit code, stdout and stderr; on timeout the
    /// child is killed and an `Error: ` string comes back promptly.
    pub async fn run_specific_tests(&self, test_paths: &str) -> String {
        render(self.try_run_specific_tests(test_paths).await)
    }

    async fn try_run_specific_tests(&self, test_paths: &str) -> Result<String, ToolError> {
        let tests: Vec<String> = test_paths
            .split_whitespace()
            .map(|p| self.ctx.normalize(p).to_string())
            .collect();

        let (program, fixed_args) = self
            .config
            .test_runner
            .split_first()
            .ok_or_else(|| ToolError::TestRunFailure("empty test runner command".to_string()))?;

        let mut cmd = tokio::process::Command::new(program);
        cmd.args(fixed_args)
            .arg("-xvs")
            .args(&tests)
            .current_dir(self.ctx.repo_root())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(runner = %program, tests = tests.len(), "Running specific tests");

        let child = cmd.spawn().map_err(|e| {
            ToolError::TestRunFailure(format!("failed to spawn {program}: {e}"))
        })?;

        let output =
            match tokio::time::timeout(self.config.test_timeout, child.wait_with_output()).await {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => {
                    return Err(ToolError::TestRunFailure(format!(
                        "failed to collect test output: {e}"
                    )));
                }
                // Dropping the future reaps the child via kill_on_drop.
                Err(_) => {
                    warn!(timeout = ?self.config.test_timeout, "Test run timed out");
                    return Err(ToolError::TestRunTimeout(self.config.test_timeout));
                }
            };

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(exit_code, "Test run finished");
        Ok(format!(
            "exit code: {exit_code}\n\nstdout:\n{stdout}\n\nstderr:\n{stderr}"
        ))
    }
}

/// Renders an internal tool result into the string the runtime consumes.
fn render(result: Result<String, ToolError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => format!("Error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::guard::MAX_READS_PER_FILE;
    use tempfile::TempDir;

    fn tools_in(temp: &TempDir) -> FileTools {
        FileTools::new(TaskContext::new(temp.path(), "1"))
    }

    #[test]
    fn write_then_read_round_trips() {
        let temp = TempDir::new().unwrap();
        let mut tools = tools_in(&temp);

        let written = tools.write_file("src/app.py", "print('hi')\n");
        assert_eq!(written, "File src/app.py written successfully");
        assert_eq!(tools.read_file("src/app.py"), "print('hi')\n");
    }

    #[test]
    fn prefixed_path_reads_the_same_file() {
        let temp = TempDir::new().unwrap();
        let mut tools = tools_in(&temp);

        tools.write_file("lib/core.py", "x = 1\n");
        assert_eq!(tools.read_file("repo_1/lib/core.py"), "x = 1\n");
        assert_eq!(tools.read_file("lib/core.py"), "x = 1\n");
        // Both spellings hit the same read counter.
        assert_eq!(tools.context().read_attempts("lib/core.py"), 2);
    }

    #[test]
    fn read_missing_file_is_an_error_string() {
        let temp = TempDir::new().unwrap();
        let mut tools = tools_in(&temp);

        let result = tools.read_file("nope.py");
        assert!(result.starts_with("Error: "), "got: {result}");
        assert!(result.contains("not found"));
    }

    #[test]
    fn read_binary_file_is_reported_distinctly() {
        let temp = TempDir::new().unwrap();
        let mut tools = tools_in(&temp);

        std::fs::write(temp.path().join("blob.bin"), [0xff, 0xfe, 0x00, 0x9f]).unwrap();
        let result = tools.read_file("blob.bin");
        assert!(result.starts_with("Error: binary file"), "got: {result}");
    }

    #[test]
    fn fourth_read_trips_the_loop_guard() {
        let temp = TempDir::new().unwrap();
        let mut tools = tools_in(&temp);

        tools.write_file("a.py", "pass\n");
        for _ in 0..MAX_READS_PER_FILE {
            assert_eq!(tools.read_file("a.py"), "pass\n");
        }
        let refused = tools.read_file("a.py");
        assert!(refused.starts_with("Error: too many reads"), "got: {refused}");
        // Still refused afterwards.
        assert!(tools.read_file("a.py").starts_with("Error: too many reads"));
    }

    #[test]
    fn failed_reads_also_count_toward_the_guard() {
        let temp = TempDir::new().unwrap();
        let mut tools = tools_in(&temp);

        for _ in 0..MAX_READS_PER_FILE {
            assert!(tools.read_file("ghost.py").contains("not found"));
        }
        assert!(tools.read_file("ghost.py").starts_with("Error: too many reads"));
    }

    #[test]
    fn list_files_tags_and_sorts_entries() {
        let temp = TempDir::new().unwrap();
        let tools = FileTools::new(TaskContext::new(temp.path(), "1"));

        std::fs::write(temp.path().join("b.txt"), "b").unwrap();
        std::fs::write(temp.path().join("a.txt"), "a").unwrap();
        std::fs::create_dir(temp.path().join("c")).unwrap();

        assert_eq!(tools.list_files("."), "file a.txt\nfile b.txt\ndir c");
        // Empty argument defaults to the repository root.
        assert_eq!(tools.list_files(""), tools.list_files("."));
    }

    #[test]
    fn list_missing_directory_is_an_error_string() {
        let temp = TempDir::new().unwrap();
        let tools = tools_in(&temp);

        let result = tools.list_files("no/such/dir");
        assert!(result.starts_with("Error: "), "got: {result}");
        assert!(result.contains("not found"));
    }

    #[tokio::test]
    async fn test_run_reports_exit_code_and_streams() {
        let temp = TempDir::new().unwrap();
        let config = ToolConfig::default()
            .with_test_runner(vec!["sh".into(), "-c".into(), "echo out; echo err >&2; exit 3".into()]);
        let tools = tools_in(&temp).with_config(config);

        let report = tools.run_specific_tests("").await;
        assert!(report.contains("exit code: 3"), "got: {report}");
        assert!(report.contains("out"));
        assert!(report.contains("err"));
    }

    #[tokio::test]
    async fn test_run_times_out_promptly() {
        let temp = TempDir::new().unwrap();
        let config = ToolConfig::default()
            .with_test_runner(vec!["sh".into(), "-c".into(), "sleep 5".into()])
            .with_test_timeout(Duration::from_millis(200));
        let tools = tools_in(&temp).with_config(config);

        let start = std::time::Instant::now();
        let report = tools.run_specific_tests("").await;
        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(report.starts_with("Error: "), "got: {report}");
        assert!(report.contains("timed out"));
    }

    #[tokio::test]
    async fn test_run_spawn_failure_is_an_error_string() {
        let temp = TempDir::new().unwrap();
        let config =
            ToolConfig::default().with_test_runner(vec!["definitely-not-a-runner".into()]);
        let tools = tools_in(&temp).with_config(config);

        let report = tools.run_specific_tests("tests/test_x.py").await;
        assert!(report.starts_with("Error: "), "got: {report}");
    }
}
