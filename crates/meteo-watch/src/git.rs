//! Git-backed archive sync.
//!
//! The station publishes its archive as a git repository. [`GitSync`] clones it
//! on first use and pulls on every cycle by running the `git` binary.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::traits::ArchiveSync;

/// Remote the station publishes its archive to.
pub const DEFAULT_REMOTE: &str = "https://github.com/StazioneMeteoCocito/dati.git";

/// Branch pulled from [`DEFAULT_REMOTE`].
pub const DEFAULT_BRANCH: &str = "main";

/// Keeps a local clone of the archive repository current.
///
/// Child processes are killed when the future driving them is dropped, so a
/// cancelled or timed-out cycle does not leave `git` running.
#[derive(Debug, Clone)]
pub struct GitSync {
    root: PathBuf,
    remote: String,
    branch: String,
}

impl GitSync {
    /// Sync `root` against the station's public repository.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            remote: DEFAULT_REMOTE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
        }
    }

    /// Use a different remote. Only affects the initial clone and pulls.
    #[must_use]
    pub fn remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    #[must_use]
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `root` already holds a git checkout.
    pub fn is_cloned(&self) -> bool {
        self.root.join(".git").exists()
    }

    async fn git(&self, args: &[&str], cwd: Option<&Path>) -> Result<std::process::Output> {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        debug!("Running git {}", args.join(" "));
        let output = cmd.output().await?;
        if !output.status.success() {
            debug!(
                "git {} exited with {}: {}",
                args.first().copied().unwrap_or_default(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(output)
    }
}

#[async_trait]
impl ArchiveSync for GitSync {
    async fn ensure_local_copy(&self) -> Result<()> {
        if self.is_cloned() {
            return Ok(());
        }

        if let Some(parent) = self.root.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!("Cloning {} into {}", self.remote, self.root.display());
        let target = self.root.to_string_lossy();
        let output = self
            .git(
                &["clone", "--branch", &self.branch, "--single-branch", &self.remote, &target],
                None,
            )
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::SyncFailed(format!(
                "git clone exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

    async fn pull_latest(&self) -> Result<bool> {
        if !self.is_cloned() {
            return Err(Error::SyncFailed(format!(
                "{} is not a git checkout",
                self.root.display()
            )));
        }

        let output = self
            .git(
                &["pull", "--ff-only", "--quiet", &self.remote, &self.branch],
                Some(&self.root),
            )
            .await?;

        let pulled = output.status.success();
        if !pulled {
            warn!("git pull in {} exited with {}", self.root.display(), output.status);
        }
        Ok(pulled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_git_sync_defaults() {
        let sync = GitSync::new("/tmp/archive");
        assert_eq!(sync.remote, DEFAULT_REMOTE);
        assert_eq!(sync.branch, DEFAULT_BRANCH);
        assert_eq!(sync.root(), Path::new("/tmp/archive"));
    }

    #[test]
    fn test_git_sync_builder() {
        let sync = GitSync::new("a").remote("file:///srv/dati.git").branch("archive");
        assert_eq!(sync.remote, "file:///srv/dati.git");
        assert_eq!(sync.branch, "archive");
    }

    #[test]
    fn test_is_cloned_checks_git_dir() {
        let dir = TempDir::new().unwrap();
        let sync = GitSync::new(dir.path());
        assert!(!sync.is_cloned());

        std::fs::create_dir(dir.path().join(".git")).unwrap();
        assert!(sync.is_cloned());
    }

    #[tokio::test]
    async fn test_ensure_local_copy_is_noop_when_cloned() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        // An unreachable remote proves no clone is attempted.
        let sync = GitSync::new(dir.path()).remote("file:///nonexistent/remote.git");
        sync.ensure_local_copy().await.unwrap();
    }

    #[tokio::test]
    async fn test_pull_without_checkout_fails() {
        let dir = TempDir::new().unwrap();
        let sync = GitSync::new(dir.path().join("missing"));
        let err = sync.pull_latest().await.unwrap_err();
        assert!(matches!(err, Error::SyncFailed(_)));
    }
}
