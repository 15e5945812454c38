//! GitHub Pages site under `docs-site/`, organized by perspective.
//!
//! Each generated doc may land in several sections (`api/`, `modules/`,
//! `features/`). The model picks the sections and, per section, whether to
//! create a page, append to one, or merge into one. Every model step has a
//! deterministic fallback.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Write as _};
use std::fs as std_fs;
use std::path::{Path, PathBuf};

use ai_llm_service::json_coerce::{parse_lenient, strip_markdown_fences};
use ai_llm_service::{LlmClient, ModelProfile};
use chrono::NaiveDateTime;
use serde::Deserialize;
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::{DocRouterError, DocRouterResult};
use crate::mapping::DocMapping;
use crate::sources::{DocPair, doc_pairs, read_changed_files};
use crate::text::{preview, title_case};

const PLAN_SYSTEM: &str = "You are a documentation strategist. Return ONLY valid JSON.";
const DECIDE_SYSTEM: &str = "You are a documentation architect. Return ONLY valid JSON.";
const MERGE_SYSTEM: &str = "You are a documentation editor. Return clean markdown.";
const INDEX_FOOTER: &str = "---\n\n*Auto-generated by CI/CD Documentation System*\n";

#[derive(Debug, Clone)]
pub struct PagesConfig {
    pub workdir: PathBuf,
    pub changed_files: PathBuf,
    pub docs_dir: PathBuf,
    pub site_dir: PathBuf,
    pub mapping: PathBuf,
    pub summary: PathBuf,
    /// Shown on the home page.
    pub project_name: String,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            changed_files: PathBuf::from("changed_files.txt"),
            docs_dir: PathBuf::from("docs"),
            site_dir: PathBuf::from("docs-site"),
            mapping: PathBuf::from(".github/pages-mapping.json"),
            summary: PathBuf::from("pages_summary.md"),
            project_name: "this project".into(),
        }
    }
}

impl PagesConfig {
    /// Defaults; the project name comes from the repo part of `GITHUB_REPOSITORY`.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(name) = std::env::var("GITHUB_REPOSITORY")
            .ok()
            .and_then(|r| r.rsplit('/').next().map(str::to_string))
            .filter(|n| !n.trim().is_empty())
        {
            cfg.project_name = name;
        }
        cfg
    }

    fn at(&self, rel: &Path) -> PathBuf {
        self.workdir.join(rel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Perspective {
    Api,
    Module,
    Feature,
}

impl Perspective {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Some(Self::Api),
            "module" | "modules" => Some(Self::Module),
            "feature" | "features" => Some(Self::Feature),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Perspective::Api => "api/",
            Perspective::Module => "modules/",
            Perspective::Feature => "features/",
        }
    }

    fn guidance(self) -> &'static str {
        match self {
            Perspective::Api => {
                "Focus on technical API details, function signatures, parameters, returns, examples."
            }
            Perspective::Module => {
                "Focus on architecture, design patterns, how components interact, module boundaries."
            }
            Perspective::Feature => {
                "Focus on user guides, how to use features, configuration, real-world examples."
            }
        }
    }
}

impl Display for Perspective {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Perspective::Api => "api",
            Perspective::Module => "module",
            Perspective::Feature => "feature",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Create,
    Append,
    Modify,
}

impl PageAction {
    /// Unknown actions are treated as `create`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Self::Append,
            "modify" => Self::Modify,
            _ => Self::Create,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageAction::Create => "create",
            PageAction::Append => "append",
            PageAction::Modify => "modify",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDecision {
    /// Relative to the site dir, always under the perspective prefix.
    pub page_path: String,
    pub action: PageAction,
    pub reasoning: String,
    pub section_title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PerspectivePlan {
    #[serde(default)]
    perspectives: Vec<PerspectiveEntry>,
}

#[derive(Debug, Deserialize)]
struct PerspectiveEntry {
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct RawDecision {
    action: Option<String>,
    page_path: Option<String>,
    reasoning: Option<String>,
    section_title: Option<String>,
}

fn stem_of(source: &str) -> &str {
    Path::new(source)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source)
}

/// Forces `raw` under the perspective prefix with a `.md` suffix. Anything
/// that would escape the section falls back to `<prefix><stem>.md`.
pub fn normalize_page_path(raw: &str, perspective: Perspective, source: &str) -> String {
    let prefix = perspective.prefix();
    let fallback = format!("{prefix}{}.md", stem_of(source));
    let raw = raw.trim().trim_start_matches('/');

    let mut path = if raw.starts_with(prefix) {
        raw.to_string()
    } else {
        match Path::new(raw).file_name().and_then(|n| n.to_str()) {
            Some(name) => format!("{prefix}{name}"),
            None => return fallback,
        }
    };
    if !path.ends_with(".md") {
        path.push_str(".md");
    }
    let bad = path[prefix.len()..]
        .split('/')
        .any(|seg| seg.is_empty() || seg == ".." || seg == "." || seg == ".md");
    if bad { fallback } else { path }
}

/// Keyword table used when the model gives no usable decision.
pub fn fallback_decision(source: &str, perspective: Perspective) -> PageDecision {
    let lower = source.to_lowercase();
    let api = perspective == Perspective::Api;
    let (name, reason) = if lower.contains("auth") {
        (if api { "authentication" } else { "auth-system" }, "Authentication".to_string())
    } else if lower.contains("database") {
        (if api { "database" } else { "data-layer" }, "Database".to_string())
    } else if lower.contains("payment") {
        (if api { "payments" } else { "payment-system" }, "Payment".to_string())
    } else if lower.contains("email") {
        (if api { "notifications" } else { "notification-system" }, "Email/notifications".to_string())
    } else {
        let stem = stem_of(source);
        (stem, stem.to_string())
    };
    PageDecision {
        page_path: format!("{}{name}.md", perspective.prefix()),
        action: PageAction::Create,
        reasoning: format!("{reason} {perspective}"),
        section_title: None,
    }
}

fn page_title(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("Page");
    title_case(&stem.replace('-', " "))
}

/// `---` frontmatter block with the page title.
pub fn with_frontmatter(path: &Path, content: &str) -> String {
    format!("---\ntitle: {}\nlayout: default\n---\n\n{content}\n", page_title(path))
}

/// Sets `last_updated:` inside a leading frontmatter block, adding the key
/// when absent. Pages without frontmatter are returned unchanged.
pub fn touch_frontmatter(page: &str, now: NaiveDateTime) -> String {
    let Some(rest) = page.strip_prefix("---\n") else {
        return page.to_string();
    };
    let Some(end) = rest.find("\n---") else {
        return page.to_string();
    };
    let stamp = format!("last_updated: {}", now.format("%Y-%m-%d %H:%M:%S"));
    let mut lines: Vec<String> = rest[..end]
        .lines()
        .filter(|l| !l.starts_with("last_updated:"))
        .map(String::from)
        .collect();
    lines.push(stamp);
    format!("---\n{}{}", lines.join("\n"), &rest[end..])
}

fn plan_prompt(source: &str, doc: &str) -> String {
    format!(
        "Analyze this code documentation and determine what types of documentation should be generated.\n\n\
         **Source File:** {source}\n\n\
         **Documentation Content:**\n```markdown\n{}\n```\n\n\
         **Documentation Types:**\n\
         1. **API Reference** - Technical API docs (functions, classes, parameters, returns)\n\
         2. **Module Architecture** - Design patterns, how components interact, architecture decisions\n\
         3. **Feature Guide** - User-facing guides on how to use features, configuration, examples\n\n\
         **Your Task:**\n\
         Decide which documentation types are appropriate for this code. Return JSON array with perspectives to generate.\n\n\
         **Output Format (JSON only):**\n\
         {{\n  \"perspectives\": [\n    {{\"type\": \"api|module|feature\", \"reason\": \"Why this perspective is needed\"}}\n  ]\n}}\n\n\
         Be selective - only generate perspectives that add value. Most code needs API docs, fewer need module/feature docs.\n",
        preview(doc, 3000)
    )
}

fn decide_prompt(source: &str, doc: &str, perspective: Perspective, relevant: &[(&String, &String)]) -> String {
    let upper = perspective.to_string().to_uppercase();
    let prefix = perspective.prefix();
    let existing = if relevant.is_empty() {
        "  (No pages in this section yet)".to_string()
    } else {
        relevant
            .iter()
            .take(10)
            .map(|(p, c)| format!("  {p}: {}...", preview(c, 200)))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "You are a professional documentation architect creating **{upper}** documentation.\n\n\
         **Source File:** {source}\n\n\
         **Generated Documentation:**\n```markdown\n{}\n```\n\n\
         **Existing {upper} Pages:**\n{existing}\n\n\
         **Perspective Guidance:**\n{}\n\n\
         **Your Task:**\n\
         Decide the BEST action for integrating this into {prefix} documentation:\n\n\
         1. **CREATE** - New page for a completely new topic\n\
         2. **APPEND** - Add to existing related page\n\
         3. **MODIFY** - Update existing content\n\n\
         **Output Format (JSON only):**\n\
         {{\n  \"action\": \"create|append|modify\",\n  \"page_path\": \"{prefix}page-name.md\",\n  \"reasoning\": \"Brief explanation\",\n  \"section_title\": \"Section name (if append/modify)\"\n}}\n",
        preview(doc, 2000),
        perspective.guidance()
    )
}

fn merge_prompt(existing: &str, new: &str, section: Option<&str>, page_name: &str) -> String {
    format!(
        "You are a documentation editor. Intelligently merge new documentation into an existing page.\n\n\
         **Existing Page ({page_name}):**\n```markdown\n{}\n```\n\n\
         **New Content to Integrate:**\n```markdown\n{}\n```\n\n\
         **Section Focus:** {}\n\n\
         **Your Task:**\n\
         1. If content is about NEW functions/features → ADD new section\n\
         2. If content UPDATES existing functions → REPLACE old section with new\n\
         3. If content is SIMILAR to existing → MERGE intelligently\n\
         4. Maintain existing frontmatter (---)\n\
         5. Keep consistent formatting and structure\n\
         6. Update \"Last updated\" timestamps\n\n\
         Return the COMPLETE merged page content in markdown format.\n",
        preview(existing, 3000),
        preview(new, 2000),
        section.unwrap_or("General update")
    )
}

/// Every `.md` under `root`, keyed by `/`-separated relative path.
fn scan_pages(root: &Path) -> BTreeMap<String, PathBuf> {
    let mut pages = BTreeMap::new();
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        let p = entry.path();
        if !entry.file_type().is_file() || p.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        if let Ok(rel) = p.strip_prefix(root) {
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            pages.insert(key, p.to_path_buf());
        }
    }
    pages
}

pub struct PagesManager<'a> {
    llm: &'a LlmClient,
    cfg: PagesConfig,
    mapping: DocMapping,
    /// Existing page contents by relative path.
    existing: BTreeMap<String, String>,
}

impl<'a> PagesManager<'a> {
    /// Loads the mapping and reads every existing page, creating the site
    /// directory when missing.
    pub fn new(llm: &'a LlmClient, cfg: PagesConfig, now: NaiveDateTime) -> DocRouterResult<Self> {
        let mapping =
            DocMapping::load_or_else(&cfg.at(&cfg.mapping), || DocMapping::with_site_structure(now));
        let site = cfg.at(&cfg.site_dir);
        std_fs::create_dir_all(&site).map_err(|e| DocRouterError::io(&site, e))?;

        let mut existing = BTreeMap::new();
        for (rel, path) in scan_pages(&site) {
            match std_fs::read_to_string(&path) {
                Ok(text) => {
                    existing.insert(rel, text);
                }
                Err(e) => warn!(page = %rel, error = %e, "could not read page"),
            }
        }
        info!(pages = existing.len(), "pages manager ready");
        Ok(Self {
            llm,
            cfg,
            mapping,
            existing,
        })
    }

    pub fn mapping(&self) -> &DocMapping {
        &self.mapping
    }

    /// Which sections the doc belongs in. Falls back to `[api]`.
    pub async fn analyze_perspectives(&self, source: &str, doc: &str) -> Vec<Perspective> {
        let req = self
            .llm
            .request(ModelProfile::Slow, PLAN_SYSTEM, &plan_prompt(source, doc))
            .temperature(0.2)
            .max_tokens(16000)
            .timeout_secs(30);

        let plan = match self.llm.call_chat_json(&req).await {
            Ok(text) => parse_lenient::<PerspectivePlan>(&text),
            Err(e) => {
                warn!(%source, error = %e, "perspective analysis failed");
                None
            }
        };

        let mut chosen: Vec<Perspective> = plan
            .map(|p| p.perspectives.iter().filter_map(|e| Perspective::parse(&e.kind)).collect())
            .unwrap_or_default();
        chosen.sort();
        chosen.dedup();
        if chosen.is_empty() {
            chosen.push(Perspective::Api);
        }
        info!(%source, ?chosen, "perspectives");
        chosen
    }

    /// Placement for one perspective; never fails.
    pub async fn decide(&self, source: &str, doc: &str, perspective: Perspective) -> PageDecision {
        let relevant: Vec<(&String, &String)> = self
            .existing
            .iter()
            .filter(|(p, _)| p.starts_with(perspective.prefix()))
            .collect();
        let req = self
            .llm
            .request(
                ModelProfile::Slow,
                DECIDE_SYSTEM,
                &decide_prompt(source, doc, perspective, &relevant),
            )
            .temperature(0.2)
            .max_tokens(16000)
            .timeout_secs(30);

        let raw = match self.llm.call_chat_json(&req).await {
            Ok(text) => parse_lenient::<RawDecision>(&text),
            Err(e) => {
                warn!(%source, %perspective, error = %e, "placement decision failed");
                None
            }
        };
        let Some(raw) = raw else {
            let d = fallback_decision(source, perspective);
            info!(%source, page = %d.page_path, "using fallback placement");
            return d;
        };

        let page_path = normalize_page_path(raw.page_path.as_deref().unwrap_or(""), perspective, source);
        let decision = PageDecision {
            page_path,
            action: PageAction::parse(raw.action.as_deref().unwrap_or("create")),
            reasoning: raw.reasoning.unwrap_or_else(|| "Auto-generated".into()),
            section_title: raw.section_title.filter(|s| !s.trim().is_empty()),
        };
        info!(
            %source,
            action = decision.action.as_str(),
            page = %decision.page_path,
            reasoning = %decision.reasoning,
            "placement decided"
        );
        decision
    }

    async fn merge(&self, existing: &str, new: &str, section: Option<&str>, page_name: &str) -> String {
        let req = self
            .llm
            .request(
                ModelProfile::Slow,
                MERGE_SYSTEM,
                &merge_prompt(existing, new, section, page_name),
            )
            .temperature(0.3)
            .max_tokens(4000)
            .timeout_secs(45)
            .no_cache();
        match self.llm.call_chat(&req).await {
            Ok(merged) => strip_markdown_fences(&merged),
            Err(e) => {
                warn!(page = %page_name, error = %e, "page merge failed, appending instead");
                format!("{existing}\n\n## {}\n\n{new}", section.unwrap_or("Update"))
            }
        }
    }

    /// Writes the page according to `decision`. Append and modify on a
    /// missing page create it instead.
    pub async fn apply(&self, decision: &PageDecision, content: &str, now: NaiveDateTime) -> DocRouterResult<()> {
        let path = self.cfg.at(&self.cfg.site_dir).join(&decision.page_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| DocRouterError::io(parent, e))?;
        }
        let existing = match fs::read_to_string(&path).await {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(DocRouterError::io(&path, e)),
        };
        let section = decision.section_title.as_deref();

        let body = match (decision.action, existing) {
            (PageAction::Create, _) | (_, None) => with_frontmatter(&path, content),
            (PageAction::Append, Some(old)) => {
                let header = section.map(|s| format!("\n\n## {s}\n\n")).unwrap_or_else(|| "\n\n".into());
                format!("{}{header}{content}", touch_frontmatter(&old, now))
            }
            (PageAction::Modify, Some(old)) => {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("page");
                self.merge(&old, content, section, name).await
            }
        };
        fs::write(&path, body).await.map_err(|e| DocRouterError::io(&path, e))?;
        debug!(page = %decision.page_path, action = decision.action.as_str(), "page written");
        Ok(())
    }

    pub fn record(&mut self, source: &str, decision: &PageDecision, now: NaiveDateTime) {
        self.mapping
            .record(source, &decision.page_path, Some(decision.action.as_str()), now);
    }

    pub fn save(&mut self, now: NaiveDateTime) -> DocRouterResult<()> {
        let path = self.cfg.at(&self.cfg.mapping);
        self.mapping.save(&path, now)
    }

    /// Rewrites the section indexes and the home page from what is on disk.
    pub fn generate_index_pages(&self, now: NaiveDateTime) -> DocRouterResult<()> {
        let site = self.cfg.at(&self.cfg.site_dir);
        let pages: Vec<String> = scan_pages(&site)
            .into_keys()
            .filter(|p| !p.ends_with("index.md"))
            .collect();
        let in_section = |prefix: &str| -> Vec<&String> {
            pages.iter().filter(|p| p.starts_with(prefix)).collect()
        };
        let write = |rel: &str, body: String| -> DocRouterResult<()> {
            let path = site.join(rel);
            if let Some(parent) = path.parent() {
                std_fs::create_dir_all(parent).map_err(|e| DocRouterError::io(parent, e))?;
            }
            std_fs::write(&path, body).map_err(|e| DocRouterError::io(&path, e))
        };
        let link = |page: &str, blurb: &str| {
            let p = Path::new(page);
            let file = p.file_name().and_then(|n| n.to_str()).unwrap_or(page);
            format!("- **[{}]({file})** - {blurb}\n", page_title(p))
        };

        let api = in_section("api/");
        if !api.is_empty() {
            let mut body = String::from(
                "---\ntitle: API Reference\nlayout: default\ncategory: API Reference\n---\n\n\
                 # API Reference\n\n\
                 Low-level API documentation for all functions, classes, and interfaces.\n\n\
                 ## Available APIs\n\n",
            );
            for p in &api {
                body.push_str(&link(p.as_str(), "Technical API documentation"));
            }
            let _ = write!(body, "\n**Total:** {} API pages\n\n{INDEX_FOOTER}", api.len());
            write("api/index.md", body)?;
        }

        let modules = in_section("modules/");
        let mut body = String::from(
            "---\ntitle: Modules\nlayout: default\ncategory: Modules\n---\n\n\
             # Modules\n\n\
             Module architecture and design documentation.\n\n\
             ## Available Modules\n\n",
        );
        if modules.is_empty() {
            body.push_str("*No module documentation yet. Module-level docs will be auto-generated as the codebase evolves.*\n\n");
            body.push_str("Modules provide architectural overview, design decisions, and how different components interact.\n\n");
        } else {
            for p in &modules {
                body.push_str(&link(p.as_str(), "Module architecture and design"));
            }
            let _ = write!(body, "\n**Total:** {} modules\n\n", modules.len());
        }
        body.push_str(INDEX_FOOTER);
        write("modules/index.md", body)?;

        let features = in_section("features/");
        let mut body = String::from(
            "---\ntitle: Features\nlayout: default\ncategory: Features\n---\n\n\
             # Features\n\n\
             User-facing feature documentation and guides.\n\n\
             ## Available Features\n\n",
        );
        if features.is_empty() {
            body.push_str("*No feature documentation yet. Feature guides will be auto-generated as you develop.*\n\n");
            body.push_str("Features provide user-facing documentation on how to use and configure the system.\n\n");
        } else {
            for p in &features {
                body.push_str(&link(p.as_str(), "Feature guide and tutorial"));
            }
            let _ = write!(body, "\n**Total:** {} features\n\n", features.len());
        }
        body.push_str(INDEX_FOOTER);
        write("features/index.md", body)?;

        write(
            "index.md",
            format!(
                "---\ntitle: Home\nlayout: default\n---\n\n\
                 # Welcome to the Documentation\n\n\
                 This is the auto-generated documentation website for {}.\n\n\
                 ## Quick Links\n\n\
                 - [API Reference](api/) - Complete API documentation for all modules\n\
                 - [Modules](modules/) - Architecture and design of each module\n\
                 - [Features](features/) - User-facing guides\n\n\
                 ## Features\n\n\
                 This documentation is:\n\
                 - **Auto-generated** from code changes\n\
                 - **Always up-to-date** with the latest code\n\
                 - **Intelligently organized** by AI\n\
                 - **Professionally formatted** with consistent styling\n\n\
                 ## About\n\n\
                 This documentation is automatically generated and maintained by our intelligent CI/CD system with breaking change detection, code analysis, and security scanning.\n\n\
                 *Last updated: {}*\n",
                self.cfg.project_name,
                now.format("%Y-%m-%d %H:%M:%S")
            ),
        )?;
        info!(api = api.len(), modules = modules.len(), features = features.len(), "index pages generated");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageChange {
    pub source: String,
    pub page: String,
    pub action: PageAction,
    pub reasoning: String,
}

#[derive(Debug, Clone, Default)]
pub struct PagesOutcome {
    pub changes: Vec<PageChange>,
}

pub fn render_summary(changes: &[PageChange]) -> String {
    let mut out = format!("# GitHub Pages Update Summary\n\n**Changes Made:** {}\n\n", changes.len());
    for c in changes {
        let _ = write!(
            out,
            "### {} -> {}\n- **Action:** {}\n- **Reasoning:** {}\n\n",
            c.source,
            c.page,
            c.action.as_str().to_uppercase(),
            c.reasoning
        );
    }
    out
}

/// Places every `(source, doc)` pair on the site, regenerates indexes,
/// saves the mapping and writes `pages_summary.md`.
pub async fn run(cfg: PagesConfig, llm: &LlmClient, now: NaiveDateTime) -> DocRouterResult<Option<PagesOutcome>> {
    let Some(changed) = read_changed_files(&cfg.at(&cfg.changed_files))? else {
        info!("no changed source files");
        return Ok(None);
    };
    let pairs = doc_pairs(&changed, &cfg.at(&cfg.docs_dir));
    if pairs.is_empty() {
        info!("no documentation for changed sources");
        return Ok(None);
    }

    let summary_path = cfg.at(&cfg.summary);
    let mut manager = PagesManager::new(llm, cfg, now)?;
    let mut outcome = PagesOutcome::default();

    for DocPair { source, doc } in &pairs {
        let content = match fs::read_to_string(doc).await {
            Ok(c) => c,
            Err(e) => {
                warn!(doc = %doc.display(), error = %e, "doc unreadable, skipping");
                continue;
            }
        };
        for perspective in manager.analyze_perspectives(source, &content).await {
            let decision = manager.decide(source, &content, perspective).await;
            if let Err(e) = manager.apply(&decision, &content, now).await {
                warn!(%source, page = %decision.page_path, error = %e, "page update failed");
                continue;
            }
            manager.record(source, &decision, now);
            outcome.changes.push(PageChange {
                source: source.clone(),
                page: decision.page_path,
                action: decision.action,
                reasoning: decision.reasoning,
            });
        }
    }

    manager.generate_index_pages(now)?;
    manager.save(now)?;
    manager.mapping().verify_consistency();

    fs::write(&summary_path, render_summary(&outcome.changes))
        .await
        .map_err(|e| DocRouterError::io(&summary_path, e))?;
    info!(changes = outcome.changes.len(), "pages routing complete");
    Ok(Some(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 5).unwrap().and_hms_opt(6, 7, 8).unwrap()
    }

    #[test]
    fn page_paths_are_kept_inside_the_section() {
        assert_eq!(normalize_page_path("api/users.md", Perspective::Api, "src/u.ts"), "api/users.md");
        assert_eq!(normalize_page_path("guides/users", Perspective::Feature, "src/u.ts"), "features/users.md");
        assert_eq!(normalize_page_path("api/../../etc/passwd", Perspective::Api, "src/u.ts"), "api/u.md");
        assert_eq!(normalize_page_path("", Perspective::Module, "src/u.ts"), "modules/u.md");
    }

    #[test]
    fn fallback_uses_keyword_table() {
        let d = fallback_decision("src/auth.ts", Perspective::Api);
        assert_eq!(d.page_path, "api/authentication.md");
        assert_eq!(d.action, PageAction::Create);
        assert_eq!(fallback_decision("src/auth.ts", Perspective::Module).page_path, "modules/auth-system.md");
        assert_eq!(fallback_decision("lib/email-service.ts", Perspective::Api).page_path, "api/notifications.md");
        assert_eq!(fallback_decision("src/cart.ts", Perspective::Feature).page_path, "features/cart.md");
    }

    #[test]
    fn actions_parse_leniently() {
        assert_eq!(PageAction::parse("APPEND"), PageAction::Append);
        assert_eq!(PageAction::parse(" modify "), PageAction::Modify);
        assert_eq!(PageAction::parse("rewrite"), PageAction::Create);
        assert_eq!(Perspective::parse("modules"), Some(Perspective::Module));
        assert_eq!(Perspective::parse("guide"), None);
    }

    #[test]
    fn frontmatter_gets_last_updated() {
        let page = "---\ntitle: Users\nlayout: default\n---\n\nbody\n";
        let touched = touch_frontmatter(page, now());
        assert_eq!(
            touched,
            "---\ntitle: Users\nlayout: default\nlast_updated: 2025-04-05 06:07:08\n---\n\nbody\n"
        );
        assert_eq!(touch_frontmatter(&touched, now()), touched);
        assert_eq!(touch_frontmatter("no frontmatter", now()), "no frontmatter");
    }

    #[test]
    fn new_page_has_title_from_file_name() {
        let page = with_frontmatter(Path::new("docs-site/api/user-profile.md"), "hello");
        assert_eq!(page, "---\ntitle: User Profile\nlayout: default\n---\n\nhello\n");
    }

    #[test]
    fn summary_lists_each_change() {
        let s = render_summary(&[PageChange {
            source: "src/a.ts".into(),
            page: "api/a.md".into(),
            action: PageAction::Append,
            reasoning: "related".into(),
        }]);
        assert!(s.starts_with("# GitHub Pages Update Summary\n\n**Changes Made:** 1\n\n"));
        assert!(s.contains("### src/a.ts -> api/a.md\n- **Action:** APPEND\n- **Reasoning:** related\n"));
    }
}
