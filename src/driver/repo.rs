//! Git checkout management for task repositories.
//!
//! Each task gets its own checkout directory; git runs with terminal
//! prompts disabled so a missing credential fails fast instead of hanging
//! the run.

use std::path::Path;
use std::process::Output;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::DriverError;

fn check(op: &str, output: Output) -> Result<Output, DriverError> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(DriverError::Git {
            op: op.to_string(),
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Clones `repo_url` into `dest`, removing any stale checkout first.
pub async fn clone_repo(repo_url: &str, dest: &Path) -> Result<(), DriverError> {
    if dest.exists() {
        debug!(dest = %dest.display(), "Removing stale checkout");
        remove_checkout(dest)?;
    }
    info!(url = %repo_url, dest = %dest.display(), "Cloning repository");

    let output = Command::new("git")
        .arg("clone")
        .arg(repo_url)
        .arg(dest)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .await?;
    check("clone", output)?;
    Ok(())
}

/// Checks out `commit` inside `repo_dir`.
pub async fn checkout(repo_dir: &Path, commit: &str) -> Result<(), DriverError> {
    info!(%commit, "Checking out commit");

    let output = Command::new("git")
        .args(["checkout", commit])
        .current_dir(repo_dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .await?;
    check("checkout", output)?;
    Ok(())
}

/// Returns true if the working tree differs from HEAD.
pub async fn has_changes(repo_dir: &Path) -> Result<bool, DriverError> {
    let output = Command::new("git")
        .args(["diff", "--exit-code"])
        .current_dir(repo_dir)
        .output()
        .await?;
    Ok(!output.status.success())
}

/// Captures the working-tree diff.
pub async fn diff(repo_dir: &Path) -> Result<String, DriverError> {
    let output = Command::new("git")
        .args(["diff"])
        .current_dir(repo_dir)
        .output()
        .await?;
    let output = check("diff", output)?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Removes a checkout, clearing read-only bits that git leaves on object
/// files before retrying.
pub fn remove_checkout(dir: &Path) -> Result<(), DriverError> {
    if std::fs::remove_dir_all(dir).is_ok() {
        return Ok(());
    }
    make_writable(dir)?;
    std::fs::remove_dir_all(dir)?;
    Ok(())
}

fn make_writable(dir: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let mut perms = entry.metadata()?.permissions();
        if perms.readonly() {
            perms.set_readonly(false);
            std::fs::set_permissions(&path, perms)?;
        }
        if path.is_dir() {
            make_writable(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn git(args: &[&str], cwd: &Path) {
        let status = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .status()
            .await
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    async fn init_repo(dir: &Path) {
        git(&["init", "-q"], dir).await;
        git(&["config", "user.email", "harness@test"], dir).await;
        git(&["config", "user.name", "harness"], dir).await;
        std::fs::write(dir.join("app.py"), "x = 1\n").unwrap();
        git(&["add", "."], dir).await;
        git(&["commit", "-q", "-m", "init"], dir).await;
    }

    #[tokio::test]
    async fn detects_working_tree_changes() {
        let temp = TempDir::new().unwrap();
        init_repo(temp.path()).await;

        assert!(!has_changes(temp.path()).await.unwrap());

        std::fs::write(temp.path().join("app.py"), "x = 2\n").unwrap();
        assert!(has_changes(temp.path()).await.unwrap());

        let patch = diff(temp.path()).await.unwrap();
        assert!(patch.contains("-x = 1"));
        assert!(patch.contains("+x = 2"));
    }

    #[tokio::test]
    async fn checkout_of_unknown_commit_fails() {
        let temp = TempDir::new().unwrap();
        init_repo(temp.path()).await;

        let result = checkout(temp.path(), "0000000000000000000000000000000000000000").await;
        assert!(matches!(result, Err(DriverError::Git { .. })));
    }

    #[test]
    fn removes_checkouts_with_readonly_entries() {
        let temp = TempDir::new().unwrap();
        let checkout = temp.path().join("repo_1");
        let objects = checkout.join("objects");
        std::fs::create_dir_all(&objects).unwrap();
        let pack = objects.join("pack.idx");
        std::fs::write(&pack, "data").unwrap();

        let mut perms = std::fs::metadata(&pack).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&pack, perms).unwrap();

        remove_checkout(&checkout).unwrap();
        assert!(!checkout.exists());
    }
}
