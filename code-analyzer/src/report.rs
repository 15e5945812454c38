//! Markdown rendering of an analysis run.

use std::fmt::Write as _;
use std::path::Path;

use crate::types::FileAnalysis;

/// Commit/run metadata printed in the report header.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub commit_sha: String,
    pub repository: String,
    /// Already formatted, e.g. `2025-01-31 12:00:00`.
    pub generated_at: String,
}

impl ReportContext {
    fn short_sha(&self) -> String {
        self.commit_sha.chars().take(7).collect()
    }
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

pub fn average_score(results: &[FileAnalysis]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let sum: u32 = results.iter().map(|r| r.quality_score.total).sum();
    sum as f64 / results.len() as f64
}

/// Renders `report.md`.
pub fn render_markdown(results: &[FileAnalysis], ctx: &ReportContext) -> String {
    let avg = average_score(results);
    let total_vulns: usize = results.iter().map(|r| r.security_vulnerabilities.len()).sum();
    let total_perf: usize = results.iter().map(|r| r.performance_issues.len()).sum();

    let mut out = String::from("# Code Analysis Report\n\n");
    let _ = writeln!(out, "*Generated: {}*\n", ctx.generated_at);
    let _ = writeln!(
        out,
        "**Commit:** [`{}`](https://github.com/{}/commit/{})\n",
        ctx.short_sha(),
        ctx.repository,
        ctx.commit_sha
    );

    out.push_str("## 📊 Overall Statistics\n\n");
    let _ = writeln!(out, "- **Files Analyzed:** {}", results.len());
    let _ = writeln!(out, "- **Average Quality Score:** {avg:.1}/100");
    let _ = writeln!(out, "- **Security Vulnerabilities:** {total_vulns}");
    let _ = writeln!(out, "- **Performance Issues:** {total_perf}\n");

    out.push_str("## 📈 Quality Scores\n\n");
    out.push_str("| File | Score | Grade | Doc | Complexity | Maint |\n");
    out.push_str("|------|-------|-------|-----|------------|-------|\n");

    let mut sorted: Vec<&FileAnalysis> = results.iter().collect();
    sorted.sort_by(|a, b| b.quality_score.total.cmp(&a.quality_score.total));
    for r in sorted {
        let s = &r.quality_score;
        let _ = writeln!(
            out,
            "| {} | {}/100 | {} | {}/30 | {}/30 | {}/40 |",
            file_name(&r.file),
            s.total,
            s.grade,
            s.documentation,
            s.complexity,
            s.maintainability
        );
    }

    if total_vulns > 0 {
        out.push_str("\n## 🚨 Security Vulnerabilities\n\n");
        for r in results.iter().filter(|r| !r.security_vulnerabilities.is_empty()) {
            let _ = writeln!(out, "### {}\n", file_name(&r.file));
            for v in &r.security_vulnerabilities {
                let _ = writeln!(out, "**{}** - Line {}: {}", v.severity, v.line, v.description);
                let _ = writeln!(out, "```\n{}\n```\n", v.code);
            }
        }
    }

    if total_perf > 0 {
        out.push_str("\n## 🐌 Performance Issues\n\n");
        for r in results.iter().filter(|r| !r.performance_issues.is_empty()) {
            let _ = writeln!(out, "### {}\n", file_name(&r.file));
            for p in &r.performance_issues {
                let _ = writeln!(out, "**{}** - Line {}: {}", p.severity, p.line, p.description);
                let _ = writeln!(out, "*Suggestion: {}*\n", p.suggestion);
            }
        }
    }

    out.push_str("\n## 💡 Recommendations\n\n");
    if avg < 70.0 {
        out.push_str(
            "- 📝 **Improve documentation coverage** - Add comments explaining complex logic\n",
        );
    }
    if total_vulns > 0 {
        let _ = writeln!(
            out,
            "- 🔒 **Address {total_vulns} security vulnerabilities** - Review flagged issues"
        );
    }
    if total_perf > 0 {
        let _ = writeln!(
            out,
            "- ⚡ **Optimize {total_perf} performance issues** - Consider algorithmic improvements"
        );
    }
    out
}
