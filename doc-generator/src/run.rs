//! One documentation run over `changed_files.txt`.

use std::path::{Path, PathBuf};

use ai_llm_service::LlmClient;
use chrono::NaiveDate;
use code_analyzer::language::is_code_file;
use tokio::fs;
use tracing::{info, warn};

use crate::breaking::{BreakingChange, BreakingReport, detect_breaking_changes};
use crate::changelog::{ChangelogEntry, changelog_entry, update_changelog};
use crate::comment::{CommentInput, render_pr_comment};
use crate::docs::{diff_context, file_name, generate_documentation, render_doc_page};
use crate::errors::{DocGenError, DocGenResult};
use crate::impact::{Impact, analyze_cross_file_impact};
use crate::revision::RevisionSource;

#[derive(Debug, Clone)]
pub struct DocGenConfig {
    /// Repository checkout; every other path is relative to it.
    pub workdir: PathBuf,
    pub changed_files: PathBuf,
    pub docs_dir: PathBuf,
    pub changelog: PathBuf,
    pub comment_out: PathBuf,
    pub breaking_flag: PathBuf,
    pub changelog_json: PathBuf,
    pub base_rev: String,
    pub head_rev: String,
}

impl Default for DocGenConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            changed_files: PathBuf::from("changed_files.txt"),
            docs_dir: PathBuf::from("docs"),
            changelog: PathBuf::from("CHANGELOG.md"),
            comment_out: PathBuf::from("doc_output.md"),
            breaking_flag: PathBuf::from("breaking_changes.txt"),
            changelog_json: PathBuf::from("changelog_entries.json"),
            base_rev: "HEAD~1".into(),
            head_rev: "HEAD".into(),
        }
    }
}

impl DocGenConfig {
    /// Defaults, with `DOCS_BASE_REV` / `DOCS_HEAD_REV` overriding the
    /// compared revisions.
    pub fn from_env() -> Self {
        let non_empty = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();
        if let Some(base) = non_empty("DOCS_BASE_REV") {
            cfg.base_rev = base;
        }
        if let Some(head) = non_empty("DOCS_HEAD_REV") {
            cfg.head_rev = head;
        }
        cfg
    }

    fn at(&self, rel: &Path) -> PathBuf {
        self.workdir.join(rel)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocGenOutcome {
    /// Generated pages, relative to the workdir (`docs/<stem>.md`).
    pub docs: Vec<String>,
    pub breaking_changes: Vec<BreakingChange>,
    pub has_breaking: bool,
    pub impacts: Vec<Impact>,
    pub changelog_entries: Vec<ChangelogEntry>,
}

struct ChangedFile {
    path: String,
    content: String,
    old: Option<String>,
    diff: Option<String>,
    report: BreakingReport,
}

async fn write(path: &Path, body: &str) -> DocGenResult<()> {
    fs::write(path, body).await.map_err(|e| DocGenError::io(path, e))
}

async fn read_changed_list(path: &Path) -> DocGenResult<Option<Vec<String>>> {
    match fs::read_to_string(path).await {
        Ok(text) => Ok(Some(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DocGenError::io(path, e)),
    }
}

async fn load(cfg: &DocGenConfig, revisions: &RevisionSource, code_files: &[String]) -> Vec<ChangedFile> {
    let mut loaded = Vec::new();
    for path in code_files {
        let full = cfg.workdir.join(path);
        let content = match fs::read(&full).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(file = %path, "skipping deleted file");
                continue;
            }
            Err(e) => {
                warn!(file = %path, error = %e, "skipping unreadable file");
                continue;
            }
        };
        let old = revisions.previous(path, &cfg.base_rev).await;
        let diff = revisions.diff(path, &cfg.base_rev, &cfg.head_rev).await;
        let report = detect_breaking_changes(old.as_deref(), &content);
        if report.has_breaking {
            for c in &report.changes {
                warn!(file = %path, symbol = %c.symbol, message = %c.message, "breaking change");
            }
        }
        info!(file = %path, chars = content.len(), previous = old.is_some(), "loaded");
        loaded.push(ChangedFile {
            path: path.clone(),
            content,
            old,
            diff,
            report,
        });
    }
    loaded
}

/// Runs the documentation pipeline. Returns `None` when there is nothing
/// to document (no list, no code files, or every file deleted).
///
/// # Errors
/// Only local I/O failures while writing outputs; LLM and git failures
/// degrade to placeholders.
pub async fn run(
    cfg: &DocGenConfig,
    llm: &LlmClient,
    revisions: &RevisionSource,
    today: NaiveDate,
) -> DocGenResult<Option<DocGenOutcome>> {
    let Some(changed) = read_changed_list(&cfg.at(&cfg.changed_files)).await? else {
        info!("no changed files detected");
        return Ok(None);
    };
    let code_files: Vec<String> = changed.into_iter().filter(|f| is_code_file(f)).collect();
    if code_files.is_empty() {
        info!("no code files changed");
        return Ok(None);
    }
    info!(files = code_files.len(), "documenting changed files");

    let files = load(cfg, revisions, &code_files).await;
    if files.is_empty() {
        info!("no files to process");
        return Ok(None);
    }

    let pairs: Vec<(String, String)> = files
        .iter()
        .map(|f| (f.path.clone(), f.content.clone()))
        .collect();
    let impacts = analyze_cross_file_impact(&pairs);
    info!(count = impacts.len(), "cross-file impacts");

    let docs_dir = cfg.at(&cfg.docs_dir);
    fs::create_dir_all(&docs_dir)
        .await
        .map_err(|e| DocGenError::io(&docs_dir, e))?;

    let mut outcome = DocGenOutcome {
        impacts,
        ..Default::default()
    };

    for f in &files {
        let context = diff_context(&f.path, &f.content, f.old.as_deref(), f.diff.as_deref());
        let body = generate_documentation(llm, &context).await;

        let stem = Path::new(&f.path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("index");
        let rel = cfg.docs_dir.join(format!("{stem}.md"));
        write(&cfg.at(&rel), &render_doc_page(&f.path, &f.report, &body)).await?;
        info!(file = %f.path, doc = %rel.display(), "documentation written");
        outcome.docs.push(rel.to_string_lossy().into_owned());

        if let Some(content) = changelog_entry(f.old.as_deref(), &f.content, &f.report) {
            outcome.changelog_entries.push(ChangelogEntry {
                file: file_name(&f.path).to_string(),
                content,
            });
        }
        outcome.breaking_changes.extend(f.report.changes.iter().cloned());
    }
    outcome.has_breaking = !outcome.breaking_changes.is_empty();

    update_changelog(&cfg.at(&cfg.changelog), &outcome.changelog_entries, today)?;
    write(
        &cfg.at(&cfg.changelog_json),
        &serde_json::to_string_pretty(&outcome.changelog_entries)?,
    )
    .await?;

    let comment = render_pr_comment(&CommentInput {
        code_files: &code_files,
        doc_files: &outcome.docs,
        breaking_changes: &outcome.breaking_changes,
        impacts: &outcome.impacts,
        changelog_entries: &outcome.changelog_entries,
    });
    write(&cfg.at(&cfg.comment_out), &comment).await?;

    if outcome.has_breaking {
        write(&cfg.at(&cfg.breaking_flag), "true").await?;
        warn!(count = outcome.breaking_changes.len(), "breaking changes detected");
    }

    info!(
        docs = outcome.docs.len(),
        changelog_entries = outcome.changelog_entries.len(),
        breaking = outcome.has_breaking,
        "documentation run complete"
    );
    Ok(Some(outcome))
}
