//! Performance anti-pattern detection.
//!
//! - `nested_loops`: a `for ...:` header directly followed by another `for`.
//! - `n_squared_iteration`: an inner loop over the same collection on the
//!   same line as the outer `for x in items:`.
//! - `large_function`: more than 100 lines between successive function starts.
//!
//! Patterns overlap freely (a long function full of nested loops is reported
//! under every rule it trips).

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::language::{Language, function_starts};
use crate::types::{Severity, line_of};

const LARGE_FUNCTION_LINES: usize = 100;

lazy_static! {
    static ref NESTED_LOOPS: Regex = Regex::new(r"(?m)for\s+.*:\s*\n\s*for\s+").unwrap();
    static ref OUTER_LOOP: Regex = Regex::new(r"for\s+\w+\s+in\s+(\w+):").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    NestedLoops,
    NSquaredIteration,
    LargeFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
    pub line: usize,
    pub suggestion: String,
}

fn nested_loops(content: &str) -> Vec<PerformanceIssue> {
    NESTED_LOOPS
        .find_iter(content)
        .map(|m| PerformanceIssue {
            kind: IssueKind::NestedLoops,
            severity: Severity::Medium,
            description: "Nested loops detected - possible O(n²) complexity".into(),
            line: line_of(content, m.start()),
            suggestion: "Consider using hash maps or optimizing the algorithm".into(),
        })
        .collect()
}

/// `for a in xs: ... for b in xs` on one line. The collection name is
/// compared textually, so `xs` also matches an inner `xs_sorted`.
fn n_squared(content: &str) -> Vec<PerformanceIssue> {
    let mut issues = Vec::new();
    let mut resume_at = 0;

    for caps in OUTER_LOOP.captures_iter(content) {
        let (Some(whole), Some(collection)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() < resume_at {
            continue;
        }
        let line_end = content[whole.end()..]
            .find('\n')
            .map(|i| whole.end() + i)
            .unwrap_or(content.len());
        let rest = &content[whole.end()..line_end];

        let Ok(inner) = Regex::new(&format!(
            r"for\s+\w+\s+in\s+{}",
            regex::escape(collection.as_str())
        )) else {
            continue;
        };
        if let Some(last) = inner.find_iter(rest).last() {
            resume_at = whole.end() + last.end();
            issues.push(PerformanceIssue {
                kind: IssueKind::NSquaredIteration,
                severity: Severity::High,
                description: "O(n²) pattern detected - iterating same collection in nested loops"
                    .into(),
                line: line_of(content, whole.start()),
                suggestion: "Use hash set/map for O(n) lookup instead".into(),
            });
        }
    }
    issues
}

fn large_functions(content: &str, language: Language) -> Vec<PerformanceIssue> {
    let starts = function_starts(content, language);
    starts
        .iter()
        .enumerate()
        .filter_map(|(i, (start, name))| {
            let end = starts.get(i + 1).map(|s| s.0).unwrap_or(content.len());
            let length = content[*start..end].matches('\n').count();
            (length > LARGE_FUNCTION_LINES).then(|| PerformanceIssue {
                kind: IssueKind::LargeFunction,
                severity: Severity::Low,
                description: format!(
                    "Large function \"{name}\" ({length} lines) may impact performance"
                ),
                line: line_of(content, *start),
                suggestion: "Consider breaking into smaller functions".into(),
            })
        })
        .collect()
}

/// Runs every performance rule; output is grouped by rule.
pub fn scan_performance(content: &str, language: Option<Language>) -> Vec<PerformanceIssue> {
    let mut issues = nested_loops(content);
    issues.extend(n_squared(content));
    if let Some(lang) = language {
        issues.extend(large_functions(content, lang));
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_for_headers_are_flagged() {
        let src = "x = 1\nfor a in xs:\n    for b in ys:\n        pass\n";
        let issues = scan_performance(src, Some(Language::Python));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::NestedLoops);
        assert_eq!(issues[0].line, 2);
    }

    #[test]
    fn same_collection_on_one_line_is_quadratic() {
        let src = "pairs = [(a, b) for a in items: for b in items]\n";
        let issues = n_squared(src);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::High);
        assert!(n_squared("for a in items: for b in other\n").is_empty());
    }

    #[test]
    fn long_functions_are_reported_with_name() {
        let body = "    x += 1\n".repeat(120);
        let src = format!("def big():\n{body}def small():\n    pass\n");
        let issues = scan_performance(&src, Some(Language::Python));
        let large: Vec<_> = issues.iter().filter(|i| i.kind == IssueKind::LargeFunction).collect();
        assert_eq!(large.len(), 1);
        assert_eq!(large[0].line, 1);
        assert!(large[0].description.contains("\"big\""));
    }

    #[test]
    fn kind_serializes_as_type_field() {
        let issue = &nested_loops("for a in b:\n for c in d:\n")[0];
        let v = serde_json::to_value(issue).unwrap();
        assert_eq!(v["type"], "nested_loops");
        assert_eq!(v["severity"], "MEDIUM");
    }
}
