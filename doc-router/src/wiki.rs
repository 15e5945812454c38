//! GitHub Wiki routing: one wiki page per documentation domain.
//!
//! Pages are prepared under `wiki_updates/` and pushed to the wiki
//! repository by the workflow; this module never talks to the wiki git
//! remote itself.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use ai_llm_service::json_coerce::strip_markdown_fences;
use ai_llm_service::{LlmClient, ModelProfile};
use chrono::NaiveDateTime;
use tokio::fs;
use tracing::{info, warn};

use crate::errors::{DocRouterError, DocRouterResult};
use crate::mapping::DocMapping;
use crate::sources::{DocPair, doc_pairs, read_changed_files};
use crate::text::{preview, title_case};

const MAX_PAGE_NAME: usize = 100;
const SUMMARY_FILE_LIST_MAX: usize = 5;

const NAMING_SYSTEM: &str = "You are a documentation expert. Return only the wiki page name.";
const MERGE_SYSTEM: &str = "You are a wiki editor. Return clean markdown.";

#[derive(Debug, Clone)]
pub struct WikiConfig {
    pub workdir: PathBuf,
    pub changed_files: PathBuf,
    pub docs_dir: PathBuf,
    pub mapping: PathBuf,
    pub out_dir: PathBuf,
    pub summary: PathBuf,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            changed_files: PathBuf::from("changed_files.txt"),
            docs_dir: PathBuf::from("docs"),
            mapping: PathBuf::from(".github/wiki-mapping.json"),
            out_dir: PathBuf::from("wiki_updates"),
            summary: PathBuf::from("wiki_summary.md"),
        }
    }
}

impl WikiConfig {
    fn at(&self, rel: &Path) -> PathBuf {
        self.workdir.join(rel)
    }
}

fn stamp(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Deterministic page name from the path alone.
pub fn fallback_page_name(file: &str) -> String {
    let path = Path::new(file);
    let lower = file.to_lowercase();
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file);

    if lower.contains("auth") {
        "Authentication-API".into()
    } else if lower.contains("database") || lower.contains("db") {
        "Database-Layer".into()
    } else if path.iter().any(|c| c == "api") {
        format!("API-{}", title_case(stem))
    } else if lower.contains("test") {
        "Testing-Guide".into()
    } else if lower.contains("util") || lower.contains("helper") {
        "Utilities".into()
    } else {
        title_case(&stem.replace(['_', '.'], "-"))
    }
}

/// Cleans a model answer down to a page name; `None` if it is unusable.
pub fn clean_page_name(raw: &str) -> Option<String> {
    let name = raw
        .trim()
        .lines()
        .next()?
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '`'))
        .trim();
    let valid = !name.is_empty() && name.chars().count() <= MAX_PAGE_NAME && !name.contains('/');
    valid.then(|| name.to_string())
}

/// Appends `new` after a rule and refreshes the `*Last updated:` line.
pub fn simple_merge(existing: &str, new: &str, now: NaiveDateTime) -> String {
    let mut replaced = false;
    let lines: Vec<String> = existing
        .split('\n')
        .map(|line| {
            if !replaced && line.starts_with("*Last updated:") {
                replaced = true;
                format!("*Last updated: {}*", stamp(now))
            } else {
                line.to_string()
            }
        })
        .collect();
    format!("{}\n\n---\n\n{new}", lines.join("\n"))
}

fn naming_prompt(file: &str, content: &str, existing: &[String], mapping: &DocMapping) -> String {
    let pages = if existing.is_empty() {
        "  (No pages yet)".to_string()
    } else {
        existing.iter().map(|p| format!("  - {p}")).collect::<Vec<_>>().join("\n")
    };
    let mut previous = String::new();
    if !mapping.file_to_page.is_empty() {
        previous.push_str("Previous mappings:\n");
        let examples: Vec<String> = mapping
            .file_to_page
            .iter()
            .take(10)
            .map(|(f, refs)| format!("  - {f} → {}", refs.pages().join(", ")))
            .collect();
        previous.push_str(&examples.join("\n"));
    }

    format!(
        "You are a documentation organizer. Determine the BEST wiki page name for this code file.\n\n\
         File: {file}\n\n\
         File content preview:\n```\n{}\n```\n\n\
         Existing wiki pages:\n{pages}\n\n\
         {previous}\n\n\
         RULES:\n\
         1. Use existing pages when appropriate (prefer consistency)\n\
         2. Create new pages for distinct modules/domains\n\
         3. Group related functionality together\n\
         4. Use clear, descriptive names (e.g., \"Authentication-API\", \"Database-Layer\")\n\
         5. For files in same directory/domain, use same page\n\
         6. Use Title-Case-With-Dashes format\n\n\
         Examples:\n\
         - auth.ts → \"Authentication-API\"\n\
         - database.ts → \"Database-Layer\"\n\
         - api/users.ts → \"API-Users\"\n\
         - utils/format.ts → \"Utilities\"\n\
         - test files → \"Testing-Guide\"\n\n\
         Return ONLY the wiki page name, nothing else.",
        preview(content, 1000)
    )
}

fn merge_prompt(existing: &str, new: &str, now: NaiveDateTime) -> String {
    format!(
        "You are a wiki editor. Intelligently merge new documentation into existing wiki page.\n\n\
         **Existing Wiki Page:**\n```markdown\n{}\n```\n\n\
         **New Documentation:**\n```markdown\n{}\n```\n\n\
         **Task:**\n\
         1. If documenting NEW functions/classes → ADD as new section\n\
         2. If UPDATING existing functions → REPLACE that section\n\
         3. If similar content exists → MERGE and deduplicate\n\
         4. Update \"Last updated\" timestamp to: {}\n\
         5. Maintain wiki structure and formatting\n\n\
         Return the COMPLETE merged wiki page.\n",
        preview(existing, 3000),
        preview(new, 2000),
        stamp(now)
    )
}

pub struct WikiManager<'a> {
    llm: &'a LlmClient,
    cfg: WikiConfig,
    mapping: DocMapping,
    existing_pages: Vec<String>,
}

impl<'a> WikiManager<'a> {
    /// Loads the mapping; `existing_pages` are the titles already in the wiki.
    pub fn new(llm: &'a LlmClient, cfg: WikiConfig, existing_pages: Vec<String>, now: NaiveDateTime) -> Self {
        let mapping = DocMapping::load_or_else(&cfg.at(&cfg.mapping), || DocMapping::new(now));
        info!(existing = existing_pages.len(), mapped = mapping.file_to_page.len(), "wiki manager ready");
        Self {
            llm,
            cfg,
            mapping,
            existing_pages,
        }
    }

    pub fn mapping(&self) -> &DocMapping {
        &self.mapping
    }

    /// Existing mapping first, then the model, then [`fallback_page_name`].
    pub async fn determine_page(&self, file: &str, content: &str) -> String {
        if let Some(page) = self.mapping.pages_for(file).first() {
            info!(%file, %page, "using existing mapping");
            return page.to_string();
        }

        let prompt = naming_prompt(file, content, &self.existing_pages, &self.mapping);
        let req = self
            .llm
            .request(ModelProfile::Slow, NAMING_SYSTEM, &prompt)
            .temperature(0.1)
            .max_tokens(50)
            .timeout_secs(15);

        match self.llm.call_chat(&req).await {
            Ok(answer) => match clean_page_name(&answer) {
                Some(page) => {
                    info!(%file, %page, "page chosen by model");
                    page
                }
                None => {
                    let page = fallback_page_name(file);
                    warn!(%file, %page, answer = %preview(&answer, 120), "invalid page name from model, using fallback");
                    page
                }
            },
            Err(e) => {
                let page = fallback_page_name(file);
                warn!(%file, %page, error = %e, "page naming failed, using fallback");
                page
            }
        }
    }

    async fn merge(&self, existing: &str, new: &str, now: NaiveDateTime) -> String {
        let req = self
            .llm
            .request(ModelProfile::Slow, MERGE_SYSTEM, &merge_prompt(existing, new, now))
            .temperature(0.3)
            .max_tokens(4000)
            .timeout_secs(45)
            .no_cache();
        match self.llm.call_chat(&req).await {
            Ok(merged) => strip_markdown_fences(&merged),
            Err(e) => {
                warn!(error = %e, "wiki merge failed, appending instead");
                simple_merge(existing, new, now)
            }
        }
    }

    /// Writes `wiki_updates/<page>.md`: a new page gets a header, an existing
    /// one is merged.
    pub async fn update_page(&self, page: &str, content: &str, now: NaiveDateTime) -> DocRouterResult<PathBuf> {
        let dir = self.cfg.at(&self.cfg.out_dir);
        fs::create_dir_all(&dir).await.map_err(|e| DocRouterError::io(&dir, e))?;
        let path = dir.join(format!("{page}.md"));

        let existing = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(DocRouterError::io(&path, e)),
        };

        let body = if existing.is_empty() {
            format!(
                "# {}\n\n*Last updated: {}*\n\n{content}",
                page.replace('-', " "),
                stamp(now)
            )
        } else {
            self.merge(&existing, content, now).await
        };

        fs::write(&path, body).await.map_err(|e| DocRouterError::io(&path, e))?;
        info!(%page, path = %path.display(), "wiki page prepared");
        Ok(path)
    }

    pub fn record(&mut self, file: &str, page: &str, now: NaiveDateTime) {
        self.mapping.record(file, page, None, now);
    }

    pub fn save(&mut self, now: NaiveDateTime) -> DocRouterResult<()> {
        let path = self.cfg.at(&self.cfg.mapping);
        self.mapping.save(&path, now)
    }

    pub fn summary(&self) -> String {
        let mut out = String::from("## 📚 Wiki Organization Summary\n\n");
        let _ = writeln!(out, "**Total Pages:** {}\n", self.mapping.page_metadata.len());
        for (page, meta) in &self.mapping.page_metadata {
            let _ = writeln!(out, "### {page}");
            let _ = writeln!(out, "- **Files:** {}", meta.sources.len());
            let _ = writeln!(
                out,
                "- **Last Updated:** {}",
                meta.last_updated.as_deref().unwrap_or("N/A")
            );
            if meta.sources.len() <= SUMMARY_FILE_LIST_MAX {
                out.push_str("- **Contains:**\n");
                for f in &meta.sources {
                    let _ = writeln!(out, "  - `{f}`");
                }
            } else {
                let _ = writeln!(out, "- **Contains:** {} files", meta.sources.len());
            }
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct WikiOutcome {
    /// `(source, page)` for every page written.
    pub updates: Vec<(String, String)>,
}

/// Routes every `(source, doc)` pair to a wiki page, then saves the mapping
/// and writes `wiki_summary.md`. Returns `None` when nothing was routed.
pub async fn run(
    cfg: WikiConfig,
    llm: &LlmClient,
    existing_pages: Vec<String>,
    now: NaiveDateTime,
) -> DocRouterResult<Option<WikiOutcome>> {
    let Some(changed) = read_changed_files(&cfg.at(&cfg.changed_files))? else {
        info!("no changed source files detected");
        return Ok(None);
    };
    let pairs = doc_pairs(&changed, &cfg.at(&cfg.docs_dir));
    if pairs.is_empty() {
        info!("no documentation found for changed sources");
        return Ok(None);
    }

    let workdir = cfg.workdir.clone();
    let summary_path = cfg.at(&cfg.summary);
    let mut manager = WikiManager::new(llm, cfg, existing_pages, now);
    let mut outcome = WikiOutcome::default();

    for DocPair { source, doc } in &pairs {
        let content = match fs::read_to_string(doc).await {
            Ok(c) => c,
            Err(e) => {
                warn!(doc = %doc.display(), error = %e, "doc unreadable, skipping");
                continue;
            }
        };
        let source_content = fs::read_to_string(workdir.join(source)).await.unwrap_or_default();

        let page = manager.determine_page(source, &source_content).await;
        match manager.update_page(&page, &content, now).await {
            Ok(_) => {
                manager.record(source, &page, now);
                outcome.updates.push((source.clone(), page));
            }
            Err(e) => warn!(%source, %page, error = %e, "wiki update failed"),
        }
    }

    manager.save(now)?;
    manager.mapping().verify_consistency();

    let mut summary = manager.summary();
    summary.push_str("\n## Updates Made\n\n");
    for (file, page) in &outcome.updates {
        let _ = writeln!(summary, "- `{file}` → [{page}]");
    }
    fs::write(&summary_path, summary)
        .await
        .map_err(|e| DocRouterError::io(&summary_path, e))?;

    info!(updates = outcome.updates.len(), "wiki routing complete");
    Ok(Some(outcome))
}
