//! Heuristic code analyzer for files touched by a push or pull request.
//!
//! Produces a 0–100 quality score, security findings and performance hints
//! per file using fixed regex tables. It is a lint-suggestion generator:
//! false positives and negatives are expected because nothing is parsed.

pub mod errors;
pub mod language;
pub mod performance;
pub mod quality;
pub mod report;
pub mod run;
pub mod security;
pub mod types;

use std::path::Path;

pub use language::Language;
pub use performance::{IssueKind, PerformanceIssue, scan_performance};
pub use quality::{QualityScore, quality_score};
pub use run::{AnalysisSummary, AnalyzerConfig, run};
pub use security::{SecurityFinding, scan_security};
pub use types::{FileAnalysis, Severity};

/// Analyzes in-memory source; the language is inferred from `path`.
pub fn analyze_source(path: &str, content: &str) -> FileAnalysis {
    let language = Language::from_path(Path::new(path));
    FileAnalysis {
        file: path.to_string(),
        language: language.map(|l| l.to_string()).unwrap_or_else(|| "unknown".into()),
        quality_score: quality_score(content, language),
        security_vulnerabilities: scan_security(content),
        performance_issues: scan_performance(content, language),
    }
}
