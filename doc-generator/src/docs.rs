//! Prompt construction and the per-file documentation page.

use std::fmt::Write as _;
use std::path::Path;

use ai_llm_service::{LlmClient, ModelProfile};
use code_analyzer::Language;
use tracing::warn;

use crate::breaking::BreakingReport;

pub const SYSTEM_PROMPT: &str = "You are a technical documentation expert.";

const DIFF_PREVIEW_CHARS: usize = 1000;

pub(crate) fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// File context handed to the model: the diff (first 1000 chars) when an
/// older version exists, then the current code.
pub fn diff_context(path: &str, content: &str, old: Option<&str>, diff: Option<&str>) -> String {
    let mut out = format!("## {}\n\n", file_name(path));
    if old.is_some_and(|o| !o.is_empty()) {
        out.push_str("### What Changed\n");
        if let Some(d) = diff.filter(|d| !d.is_empty()) {
            let _ = write!(out, "```diff\n{}\n```\n\n", truncate_chars(d, DIFF_PREVIEW_CHARS));
        }
        out.push_str("### Current Code\n");
    }
    let fence = Language::from_path(Path::new(path))
        .map(|l| l.to_string())
        .unwrap_or_default();
    let _ = write!(out, "```{fence}\n{content}\n```\n\n");
    out
}

pub fn documentation_prompt(context: &str) -> String {
    format!(
        "Generate comprehensive API documentation for this code file.\n\n\
         {context}\n\n\
         Include:\n\
         1. Overview - What this module does\n\
         2. Exports - All exported functions, classes, interfaces\n\
         3. Usage Examples - Practical examples for each export\n\
         4. Parameters - Describe each parameter\n\
         5. Return Values - What each function returns\n\n\
         Be thorough but concise. Format as GitHub-flavored Markdown."
    )
}

/// Asks the fast model for docs. Never fails: errors become a visible note
/// in the generated page.
pub async fn generate_documentation(llm: &LlmClient, context: &str) -> String {
    let req = llm
        .request(ModelProfile::Fast, SYSTEM_PROMPT, &documentation_prompt(context))
        .temperature(0.3)
        .max_tokens(2000)
        .timeout_secs(30);
    match llm.call_chat(&req).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "documentation generation failed");
            format!("_Documentation generation failed: {e}_\n")
        }
    }
}

/// Contents of `docs/<stem>.md`.
pub fn render_doc_page(path: &str, report: &BreakingReport, body: &str) -> String {
    let mut out = format!("# {}\n\n*Auto-generated from `{path}`*\n\n", file_name(path));
    if report.has_breaking {
        out.push_str("## ⚠️ Breaking Changes\n\n");
        for c in &report.changes {
            let _ = writeln!(out, "- **{}**: {}", c.kind.label(), c.message);
            if let (Some(old), Some(new)) = (&c.old, &c.new) {
                let _ = writeln!(out, "  - Before: `{old}`");
                let _ = writeln!(out, "  - After: `{new}`");
            }
        }
        out.push('\n');
    }
    out.push_str(body);
    out
}
