//! Persistent source-file → page mapping shared by the wiki and pages routers.
//!
//! The file is read and rewritten whole on every run. Nothing guards against
//! two CI runs committing it concurrently.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{DocRouterError, DocRouterResult};

pub const MAPPING_VERSION: &str = "1.0";

/// ISO-8601 local timestamp with microseconds, as stored in the mapping.
pub fn iso(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// One page, or several. Older mappings store a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageRefs {
    One(String),
    Many(Vec<String>),
}

impl PageRefs {
    pub fn pages(&self) -> Vec<&str> {
        match self {
            PageRefs::One(p) => vec![p.as_str()],
            PageRefs::Many(ps) => ps.iter().map(String::as_str).collect(),
        }
    }

    pub fn contains(&self, page: &str) -> bool {
        self.pages().contains(&page)
    }

    /// Adds `page` if missing; a single entry becomes a list.
    fn add(&mut self, page: &str) {
        if self.contains(page) {
            return;
        }
        match self {
            PageRefs::One(p) => *self = PageRefs::Many(vec![std::mem::take(p), page.to_string()]),
            PageRefs::Many(ps) => ps.push(page.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default)]
    pub created: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, alias = "files")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSection {
    pub title: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMapping {
    pub version: String,
    pub last_updated: String,
    #[serde(default)]
    pub file_to_page: BTreeMap<String, PageRefs>,
    #[serde(default)]
    pub page_metadata: BTreeMap<String, PageMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_structure: Option<BTreeMap<String, SiteSection>>,
}

/// A mismatch between `file_to_page` and `page_metadata`. Reported, never fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyIssue {
    MetadataWithoutFiles { page: String },
    MappedWithoutMetadata { page: String },
    SourceMismatch { page: String, mapped: usize, recorded: usize },
}

impl Display for ConsistencyIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsistencyIssue::MetadataWithoutFiles { page } => {
                write!(f, "Metadata exists for {page} but no files mapped")
            }
            ConsistencyIssue::MappedWithoutMetadata { page } => {
                write!(f, "Files mapped to {page} but it has no metadata")
            }
            ConsistencyIssue::SourceMismatch {
                page,
                mapped,
                recorded,
            } => write!(f, "Mismatch in {page}: mapped={mapped}, recorded={recorded}"),
        }
    }
}

impl DocMapping {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            version: MAPPING_VERSION.into(),
            last_updated: iso(now),
            file_to_page: BTreeMap::new(),
            page_metadata: BTreeMap::new(),
            site_structure: None,
        }
    }

    /// Fresh mapping for the pages site, with its top-level sections.
    pub fn with_site_structure(now: NaiveDateTime) -> Self {
        let section = |title: &str, category: &str| SiteSection {
            title: title.into(),
            category: category.into(),
        };
        let mut structure = BTreeMap::new();
        structure.insert("index.md".into(), section("Home", "root"));
        structure.insert("api/".into(), section("API Reference", "api"));
        structure.insert("modules/".into(), section("Modules", "modules"));
        structure.insert("features/".into(), section("Features", "features"));
        Self {
            site_structure: Some(structure),
            ..Self::new(now)
        }
    }

    /// Reads `path`, falling back to `default()` when the file is missing or
    /// unreadable as a mapping.
    pub fn load_or_else(path: &Path, default: impl FnOnce() -> Self) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "mapping unreadable, starting fresh");
                return default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "mapping corrupt, starting fresh");
                default()
            }
        }
    }

    /// Stamps `last_updated` and writes pretty JSON, creating parent dirs.
    pub fn save(&mut self, path: &Path, now: NaiveDateTime) -> DocRouterResult<()> {
        self.last_updated = iso(now);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DocRouterError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| DocRouterError::io(path, e))?;
        info!(path = %path.display(), files = self.file_to_page.len(), "mapping saved");
        Ok(())
    }

    pub fn pages_for(&self, file: &str) -> Vec<&str> {
        self.file_to_page.get(file).map(PageRefs::pages).unwrap_or_default()
    }

    /// Links `file` to `page` (keeping earlier pages) and refreshes the
    /// page's metadata.
    pub fn record(&mut self, file: &str, page: &str, action: Option<&str>, now: NaiveDateTime) {
        let stamp = iso(now);
        self.file_to_page
            .entry(file.to_string())
            .and_modify(|refs| refs.add(page))
            .or_insert_with(|| PageRefs::One(page.to_string()));

        let meta = self
            .page_metadata
            .entry(page.to_string())
            .or_insert_with(|| PageMetadata {
                created: stamp.clone(),
                ..Default::default()
            });
        if !meta.sources.iter().any(|s| s == file) {
            meta.sources.push(file.to_string());
        }
        meta.last_updated = Some(stamp);
        if let Some(a) = action {
            meta.last_action = Some(a.to_string());
        }
    }

    pub fn verify_consistency(&self) -> Vec<ConsistencyIssue> {
        let mut by_page: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (file, refs) in &self.file_to_page {
            for page in refs.pages() {
                by_page.entry(page).or_default().insert(file.as_str());
            }
        }

        let mut issues = Vec::new();
        for (page, meta) in &self.page_metadata {
            match by_page.get(page.as_str()) {
                None => issues.push(ConsistencyIssue::MetadataWithoutFiles { page: page.clone() }),
                Some(mapped) => {
                    let recorded: BTreeSet<&str> = meta.sources.iter().map(String::as_str).collect();
                    if *mapped != recorded {
                        issues.push(ConsistencyIssue::SourceMismatch {
                            page: page.clone(),
                            mapped: mapped.len(),
                            recorded: recorded.len(),
                        });
                    }
                }
            }
        }
        for page in by_page.keys() {
            if !self.page_metadata.contains_key(*page) {
                issues.push(ConsistencyIssue::MappedWithoutMetadata {
                    page: page.to_string(),
                });
            }
        }

        if issues.is_empty() {
            info!("mapping is consistent");
        } else {
            for issue in &issues {
                warn!(%issue, "mapping inconsistency");
            }
        }
        issues
    }
}
