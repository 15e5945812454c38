//! What the bot knows about the triggering comment and the PR files.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::errors::{PrBotError, PrBotResult};

/// Extensions the bot reads and may edit.
pub const BOT_CODE_EXTENSIONS: &[&str] = &["ts", "js", "tsx", "jsx", "py"];

#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Checkout of the PR head; every other path is relative to it.
    pub workdir: PathBuf,
    pub pr_files: PathBuf,
    pub response: PathBuf,
    pub pending: PathBuf,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            pr_files: PathBuf::from("pr_files.txt"),
            response: PathBuf::from("bot_response.md"),
            pending: PathBuf::from("pending_action.json"),
        }
    }
}

impl BotConfig {
    pub(crate) fn at(&self, rel: &Path) -> PathBuf {
        self.workdir.join(rel)
    }

    /// Writes `bot_response.md`.
    pub async fn write_response(&self, body: &str) -> PrBotResult<()> {
        let path = self.at(&self.response);
        fs::write(&path, body).await.map_err(|e| PrBotError::io(&path, e))
    }
}

/// The comment that triggered this run.
#[derive(Debug, Clone, Default)]
pub struct CommentContext {
    pub body: String,
    pub user: String,
    pub pr_author: String,
    pub assignees: Vec<String>,
    pub pr_number: Option<u64>,
}

impl CommentContext {
    /// Reads `COMMENT_BODY`, `COMMENT_USER`, `PR_AUTHOR`, `PR_ASSIGNEES`
    /// (comma separated) and `PR_NUMBER`.
    pub fn from_env() -> Self {
        let var = |k: &str| std::env::var(k).unwrap_or_default();
        let user = var("COMMENT_USER");
        Self {
            body: var("COMMENT_BODY"),
            user: if user.trim().is_empty() { "user".into() } else { user },
            pr_author: var("PR_AUTHOR"),
            assignees: parse_assignees(&var("PR_ASSIGNEES")),
            pr_number: var("PR_NUMBER").trim().parse().ok(),
        }
    }
}

pub fn parse_assignees(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from)
        .collect()
}

/// Only the PR author and assignees may request edits.
pub fn is_authorized(user: &str, pr_author: &str, assignees: &[String]) -> bool {
    (!pr_author.is_empty() && user == pr_author) || assignees.iter().any(|a| a == user)
}

pub fn is_bot_code_file(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| BOT_CODE_EXTENSIONS.contains(&e))
}

/// `pr_files.txt` without blanks; a missing file is an empty PR.
pub async fn read_pr_files(path: &Path) -> PrBotResult<Vec<String>> {
    match fs::read_to_string(path).await {
        Ok(text) => Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(PrBotError::io(path, e)),
    }
}

/// `(path, content)` for the code files among `files` that exist on disk.
pub async fn load_code_files(workdir: &Path, files: &[String]) -> Vec<(String, String)> {
    let mut loaded = Vec::new();
    for file in files.iter().filter(|f| is_bot_code_file(f)) {
        match fs::read_to_string(workdir.join(file)).await {
            Ok(content) => loaded.push((file.clone(), content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(%file, "not in checkout");
            }
            Err(e) => warn!(%file, error = %e, "unreadable, skipped"),
        }
    }
    loaded
}
