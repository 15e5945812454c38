//! Results left on disk by the earlier pipeline steps.

use std::path::Path;

use serde::Deserialize;
use tokio::fs;
use tracing::{info, warn};

use crate::errors::{NotifierError, NotifierResult};

const BREAKING_MARKER: &str = "⚠️ BREAKING CHANGES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakingItem {
    pub symbol: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangelogItem {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowData {
    pub changed_files: Vec<String>,
    pub breaking_changes: Vec<BreakingItem>,
    pub wiki_pages: Vec<String>,
    pub changelog_entries: Vec<ChangelogItem>,
}

async fn read_optional(path: &Path) -> NotifierResult<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(t) => Ok(Some(t)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(NotifierError::io(path, e)),
    }
}

/// `- **symbol**: message` bullets under the breaking-changes heading of the
/// PR comment, up to the next heading.
pub fn parse_breaking_bullets(doc_output: &str) -> Vec<BreakingItem> {
    let mut items = Vec::new();
    let mut inside = false;
    for line in doc_output.lines() {
        if line.contains(BREAKING_MARKER) {
            inside = true;
        } else if inside && line.starts_with('#') {
            break;
        } else if inside {
            let Some(rest) = line.strip_prefix("- **") else {
                continue;
            };
            if let Some((symbol, message)) = rest.split_once("**:") {
                items.push(BreakingItem {
                    symbol: symbol.trim().to_string(),
                    message: message.trim().to_string(),
                });
            }
        }
    }
    items
}

/// `### <page>` headings of the wiki summary.
pub fn parse_wiki_pages(summary: &str) -> Vec<String> {
    summary
        .lines()
        .filter(|l| !l.starts_with("### **"))
        .filter_map(|l| l.strip_prefix("### "))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

impl WorkflowData {
    /// Reads whatever artifacts exist in `dir`; missing ones stay empty.
    pub async fn load(dir: &Path) -> NotifierResult<Self> {
        let mut data = WorkflowData::default();

        if let Some(text) = read_optional(&dir.join("changed_files.txt")).await? {
            data.changed_files = text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(flag) = read_optional(&dir.join("breaking_changes.txt")).await? {
            if flag.trim() != "false" {
                data.breaking_changes.push(BreakingItem {
                    symbol: "API".into(),
                    message: "Breaking changes detected".into(),
                });
            }
        }

        if let Some(comment) = read_optional(&dir.join("doc_output.md")).await? {
            let detailed = parse_breaking_bullets(&comment);
            if !detailed.is_empty() {
                data.breaking_changes = detailed;
            }
        }

        if let Some(summary) = read_optional(&dir.join("wiki_summary.md")).await? {
            data.wiki_pages = parse_wiki_pages(&summary);
        }

        if let Some(json) = read_optional(&dir.join("changelog_entries.json")).await? {
            match serde_json::from_str(&json) {
                Ok(entries) => data.changelog_entries = entries,
                Err(e) => warn!(error = %e, "changelog entries unreadable"),
            }
        }

        info!(
            files = data.changed_files.len(),
            breaking = data.breaking_changes.len(),
            wiki_pages = data.wiki_pages.len(),
            changelog = data.changelog_entries.len(),
            "workflow data loaded"
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMENT: &str = "## 🤖 Auto-Generated Documentation & Analysis\n\n\
        ### ⚠️ BREAKING CHANGES DETECTED\n\n\
        This PR contains breaking changes that may affect users:\n\n\
        - **foo**: Modified signature of foo\n  ```diff\n  - a\n  + b\n  ```\n\
        - **Bar**: Removed exported class: Bar\n\n\
        ### 📁 Files Changed (1)\n\n- **not**: a breaking change\n";

    #[test]
    fn breaking_bullets_stop_at_next_heading() {
        assert_eq!(
            parse_breaking_bullets(COMMENT),
            vec![
                BreakingItem {
                    symbol: "foo".into(),
                    message: "Modified signature of foo".into()
                },
                BreakingItem {
                    symbol: "Bar".into(),
                    message: "Removed exported class: Bar".into()
                },
            ]
        );
        assert!(parse_breaking_bullets("no marker\n- **x**: y").is_empty());
    }

    #[test]
    fn wiki_pages_from_summary() {
        let s = "## 📚 Wiki Organization Summary\n\n### Authentication-API\n- **Files:** 1\n### **Bold**\n### \n";
        assert_eq!(parse_wiki_pages(s), vec!["Authentication-API"]);
    }

    #[tokio::test]
    async fn load_prefers_detailed_breaking_changes() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        assert_eq!(WorkflowData::load(p).await.unwrap(), WorkflowData::default());

        std::fs::write(p.join("changed_files.txt"), "src/a.ts\n\nsrc/b.ts\n").unwrap();
        std::fs::write(p.join("breaking_changes.txt"), "true").unwrap();
        let data = WorkflowData::load(p).await.unwrap();
        assert_eq!(data.changed_files, vec!["src/a.ts", "src/b.ts"]);
        assert_eq!(data.breaking_changes[0].symbol, "API");

        std::fs::write(p.join("doc_output.md"), COMMENT).unwrap();
        std::fs::write(p.join("changelog_entries.json"), r####"[{"file": "a.ts", "content": "### a.ts"}]"####).unwrap();
        let data = WorkflowData::load(p).await.unwrap();
        assert_eq!(data.breaking_changes.len(), 2);
        assert_eq!(data.changelog_entries[0].file, "a.ts");
    }
}
