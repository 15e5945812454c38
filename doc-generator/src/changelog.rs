//! Keep-a-changelog style entries derived from symbol diffs.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::breaking::BreakingReport;
use crate::errors::{DocGenError, DocGenResult};
use crate::symbols::{SymbolTable, extract_symbols};

pub const CHANGELOG_HEADER: &str =
    "# Changelog\n\nAll notable changes to this project will be documented in this file.\n\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub file: String,
    pub content: String,
}

fn section(out: &mut Vec<String>, title: &str, items: Vec<String>) {
    if items.is_empty() {
        return;
    }
    out.push(format!("### {title}\n"));
    out.extend(items);
    out.push(String::new());
}

/// Markdown body for one file, or `None` when nothing user-visible changed.
///
/// `Changed` is suppressed when the file already has a breaking section.
pub fn changelog_entry(old: Option<&str>, new: &str, report: &BreakingReport) -> Option<String> {
    let old_symbols = old.map(extract_symbols).unwrap_or_default();
    let new_symbols = extract_symbols(new);
    render_entry(&old_symbols, &new_symbols, report)
}

fn render_entry(old: &SymbolTable, new: &SymbolTable, report: &BreakingReport) -> Option<String> {
    let mut out = Vec::new();

    if report.has_breaking {
        let items = report.changes.iter().map(|c| format!("- {}", c.message)).collect();
        section(&mut out, "⚠️ BREAKING CHANGES", items);
    }

    let added = new
        .iter()
        .filter(|s| s.exported && !old.contains(&s.name))
        .map(|s| format!("- `{}` ({})", s.name, s.kind))
        .collect();
    section(&mut out, "✨ Added", added);

    if !report.has_breaking {
        let changed = new
            .iter()
            .filter(|s| old.get(&s.name).is_some_and(|o| o.signature != s.signature))
            .map(|s| format!("- `{}` signature updated", s.name))
            .collect();
        section(&mut out, "🔄 Changed", changed);
    }

    let removed = old
        .iter()
        .filter(|s| s.exported && !new.contains(&s.name))
        .map(|s| format!("- `{}` ({})", s.name, s.kind))
        .collect();
    section(&mut out, "🗑️ Removed", removed);

    (!out.is_empty()).then(|| out.join("\n"))
}

/// Dated block holding every entry of this run.
pub fn render_release(entries: &[ChangelogEntry], today: NaiveDate) -> String {
    let mut block = format!("## [{}]\n\n", today.format("%Y-%m-%d"));
    for e in entries {
        block.push_str(&format!("### {}\n\n{}\n\n", e.file, e.content));
    }
    block
}

/// Inserts the dated block above the newest release (the first `## ` line)
/// or appends it when the changelog has none. A missing file starts from
/// [`CHANGELOG_HEADER`]. Empty `entries` leave the file untouched.
pub fn update_changelog(path: &Path, entries: &[ChangelogEntry], today: NaiveDate) -> DocGenResult<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let current = if path.exists() {
        fs::read_to_string(path).map_err(|e| DocGenError::io(path, e))?
    } else {
        CHANGELOG_HEADER.to_string()
    };
    let block = render_release(entries, today);

    let mut lines: Vec<&str> = current.split('\n').collect();
    let updated = match lines.iter().position(|l| l.starts_with("## ")) {
        Some(pos) => {
            lines.insert(pos, &block);
            lines.join("\n")
        }
        None => format!("{current}\n{block}"),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DocGenError::io(parent, e))?;
    }
    fs::write(path, updated).map_err(|e| DocGenError::io(path, e))?;
    info!(path = %path.display(), entries = entries.len(), "changelog updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaking::detect_breaking_changes;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn breaking_entry_lists_messages_and_hides_changed() {
        let old = "export function foo(a, b) {}\n";
        let new = "export function foo(a) {}\nexport function bar() {}\n";
        let report = detect_breaking_changes(Some(old), new);
        let entry = changelog_entry(Some(old), new, &report).unwrap();
        assert!(entry.starts_with("### ⚠️ BREAKING CHANGES\n\n- Modified signature of foo\n"));
        assert!(entry.contains("### ✨ Added\n\n- `bar` (function)"));
        assert!(!entry.contains("Changed"));
    }

    #[test]
    fn compatible_change_goes_under_changed() {
        let old = "export function foo(a): number {}\n";
        let new = "export function foo(a): string {}\n";
        let report = detect_breaking_changes(Some(old), new);
        let entry = changelog_entry(Some(old), new, &report).unwrap();
        assert!(entry.contains("### 🔄 Changed\n\n- `foo` signature updated"));
        assert!(!entry.contains("Removed"));
    }

    #[test]
    fn removed_private_helper_is_not_listed() {
        let old = "export function keep() {}\nfunction helper() {}\n";
        let new = "export function keep() {}\n";
        let report = detect_breaking_changes(Some(old), new);
        assert_eq!(changelog_entry(Some(old), new, &report), None);
    }

    #[test]
    fn removed_export_is_listed() {
        let old = "export function keep() {}\nexport function gone() {}\n";
        let new = "export function keep() {}\n";
        let report = detect_breaking_changes(Some(old), new);
        let entry = changelog_entry(Some(old), new, &report).unwrap();
        assert!(entry.contains("### 🗑️ Removed\n\n- `gone` (function)"));
    }

    #[test]
    fn nothing_visible_means_no_entry() {
        let src = "function same() {}\n";
        let report = detect_breaking_changes(Some(src), src);
        assert_eq!(changelog_entry(Some(src), src, &report), None);
    }

    #[test]
    fn release_goes_above_previous_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        fs::write(&path, "# Changelog\n\n## [2025-01-01]\n\nold\n").unwrap();

        let entries = vec![ChangelogEntry {
            file: "src/a.ts".into(),
            content: "### ✨ Added\n\n- `x` (function)\n".into(),
        }];
        update_changelog(&path, &entries, day()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let new_at = text.find("## [2025-03-14]").unwrap();
        let old_at = text.find("## [2025-01-01]").unwrap();
        assert!(new_at < old_at);
        assert!(text.contains("### src/a.ts\n\n### ✨ Added"));
    }

    #[test]
    fn missing_changelog_gets_header_and_release_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        let entries = vec![ChangelogEntry {
            file: "a.ts".into(),
            content: "body".into(),
        }];
        update_changelog(&path, &entries, day()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(CHANGELOG_HEADER));
        assert!(text.ends_with("## [2025-03-14]\n\n### a.ts\n\nbody\n\n"));
    }
}
