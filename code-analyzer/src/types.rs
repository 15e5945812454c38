use serde::{Deserialize, Serialize};

use crate::{performance::PerformanceIssue, quality::QualityScore, security::SecurityFinding};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        })
    }
}

/// Everything computed for one file; serialized into `results.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub file: String,
    /// Lowercase language name, or `unknown`.
    pub language: String,
    pub quality_score: QualityScore,
    pub security_vulnerabilities: Vec<SecurityFinding>,
    pub performance_issues: Vec<PerformanceIssue>,
}

/// 1-based line number of a byte offset.
pub fn line_of(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}
