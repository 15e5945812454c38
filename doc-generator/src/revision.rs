//! Where previous file versions and diffs come from.

use git_context_engine::{GitCli, GitHubClient};
use tracing::warn;

/// Source of the "before" side of a change.
///
/// `Git` reads a local checkout with history (`fetch-depth >= 2`); `GitHub`
/// reads contents over the REST API and has no diff.
#[derive(Debug, Clone)]
pub enum RevisionSource {
    Git(GitCli),
    GitHub(GitHubClient),
}

impl RevisionSource {
    /// Contents of `path` at `rev`. Absent files and lookup failures are
    /// both `None`; failures are logged.
    pub async fn previous(&self, path: &str, rev: &str) -> Option<String> {
        let res = match self {
            RevisionSource::Git(git) => git.show_file(rev, path).await,
            RevisionSource::GitHub(gh) => gh.file_at_ref(path, rev).await,
        };
        res.unwrap_or_else(|e| {
            warn!(%path, %rev, error = %e, "previous version unavailable");
            None
        })
    }

    /// Unified diff of `path` between `base` and `head`, when available.
    pub async fn diff(&self, path: &str, base: &str, head: &str) -> Option<String> {
        match self {
            RevisionSource::Git(git) => match git.diff(base, head, path).await {
                Ok(d) if !d.trim().is_empty() => Some(d),
                Ok(_) => None,
                Err(e) => {
                    warn!(%path, error = %e, "git diff failed");
                    None
                }
            },
            RevisionSource::GitHub(_) => None,
        }
    }
}
