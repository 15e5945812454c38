//! Async wrapper over the local `git` binary.
//!
//! Every call runs `git -C <workdir> ...` and captures stdout. A non-zero
//! exit becomes [`GitCommandError::Failed`] carrying stderr.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{GitCommandError, GitContextEngineResult};

#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    async fn run(&self, args: &[&str]) -> GitContextEngineResult<String> {
        let joined = args.join(" ");
        debug!(workdir = %self.workdir.display(), args = %joined, "git");

        let out = Command::new("git")
            .arg("-C")
            .arg(&self.workdir)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| GitCommandError::Spawn {
                args: joined.clone(),
                source,
            })?;

        if !out.status.success() {
            return Err(GitCommandError::Failed {
                args: joined,
                status: out.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    /// Contents of `path` at `rev`; `None` when the file (or revision) does
    /// not exist, e.g. a file added in the latest commit.
    pub async fn show_file(&self, rev: &str, path: &str) -> GitContextEngineResult<Option<String>> {
        match self.run(&["show", &format!("{rev}:{path}")]).await {
            Ok(text) => Ok(Some(text)),
            Err(crate::GitContextEngineError::Git(GitCommandError::Failed { stderr, .. })) => {
                debug!(%rev, %path, %stderr, "no previous version");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Unified diff of one path between two revisions.
    pub async fn diff(&self, from: &str, to: &str, path: &str) -> GitContextEngineResult<String> {
        self.run(&["diff", from, to, "--", path]).await
    }

    /// Full message of the last commit.
    pub async fn last_commit_message(&self) -> GitContextEngineResult<String> {
        Ok(self.run(&["log", "-1", "--pretty=%B"]).await?.trim().to_string())
    }

    pub async fn configure_identity(&self, name: &str, email: &str) -> GitContextEngineResult<()> {
        self.run(&["config", "user.name", name]).await?;
        self.run(&["config", "user.email", email]).await?;
        Ok(())
    }

    pub async fn add(&self, paths: &[&str]) -> GitContextEngineResult<()> {
        let mut args = vec!["add", "--"];
        args.extend_from_slice(paths);
        self.run(&args).await.map(|_| ())
    }

    pub async fn commit(&self, message: &str) -> GitContextEngineResult<()> {
        self.run(&["commit", "-m", message]).await.map(|_| ())
    }

    pub async fn push(&self) -> GitContextEngineResult<()> {
        self.run(&["push"]).await.map(|_| ())
    }

    /// Abbreviated (7 char) hash of `HEAD`.
    pub async fn short_head(&self) -> GitContextEngineResult<String> {
        let full = self.run(&["rev-parse", "HEAD"]).await?;
        Ok(full.trim().chars().take(7).collect())
    }

    /// Stages `paths`, commits with `message` under the bot identity and
    /// pushes. Returns the short hash of the new commit.
    pub async fn commit_and_push(
        &self,
        paths: &[&str],
        message: &str,
        identity: (&str, &str),
    ) -> GitContextEngineResult<String> {
        self.configure_identity(identity.0, identity.1).await?;
        self.add(paths).await?;
        self.commit(message).await?;
        self.push().await?;
        let hash = self.short_head().await?;
        info!(%hash, files = paths.len(), "committed and pushed");
        Ok(hash)
    }
}
