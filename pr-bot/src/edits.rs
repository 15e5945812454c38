//! Parsing model-proposed file rewrites and applying the allowed ones.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use tokio::fs;
use tracing::{info, warn};

lazy_static! {
    /// `FILE: <path>` followed by one fenced block.
    static ref FILE_BLOCK: Regex = Regex::new(r"(?s)FILE:[ \t]*([^\n]+)\n```[^\n]*\n(.*?)```").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEdit {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposedChanges {
    pub edits: Vec<FileEdit>,
    /// Text after `CHANGES:`, if the model wrote one.
    pub summary: Option<String>,
}

fn clean_path(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| matches!(c, '`' | '*' | '"'))
        .trim()
        .trim_start_matches("./")
        .to_string()
}

pub fn parse_code_changes(output: &str) -> ProposedChanges {
    let edits = FILE_BLOCK
        .captures_iter(output)
        .map(|c| FileEdit {
            path: clean_path(&c[1]),
            content: c[2].to_string(),
        })
        .filter(|e| !e.path.is_empty())
        .collect();
    let summary = output
        .split_once("CHANGES:")
        .map(|(_, rest)| rest.trim().to_string())
        .filter(|s| !s.is_empty());
    ProposedChanges { edits, summary }
}

/// Writes each edit whose path is one of `allowed`. Returns the paths
/// actually written, in order.
pub async fn apply_edits(workdir: &Path, edits: &[FileEdit], allowed: &[String]) -> Vec<String> {
    let mut written = Vec::new();
    for edit in edits {
        if !allowed.iter().any(|a| *a == edit.path) {
            warn!(path = %edit.path, "not part of the PR, skipped");
            continue;
        }
        if written.contains(&edit.path) {
            warn!(path = %edit.path, "edited twice, keeping the first version");
            continue;
        }
        let full = workdir.join(&edit.path);
        match fs::write(&full, &edit.content).await {
            Ok(()) => {
                info!(path = %edit.path, "modified");
                written.push(edit.path.clone());
            }
            Err(e) => warn!(path = %edit.path, error = %e, "write failed"),
        }
    }
    written
}
