//! One analysis run over `changed_files.txt`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::language::is_code_file;
use crate::report::{ReportContext, average_score, render_markdown};
use crate::{FileAnalysis, analyze_source};

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Repository checkout; every other path is relative to it.
    pub workdir: PathBuf,
    pub changed_files: PathBuf,
    pub output_root: PathBuf,
    pub commit_sha: String,
    pub repository: String,
}

impl AnalyzerConfig {
    /// Reads `GITHUB_SHA` and `GITHUB_REPOSITORY`; paths default to the
    /// well-known names in the current directory.
    pub fn from_env() -> Self {
        Self {
            workdir: PathBuf::from("."),
            changed_files: PathBuf::from("changed_files.txt"),
            output_root: PathBuf::from("code-analysis"),
            commit_sha: std::env::var("GITHUB_SHA").unwrap_or_else(|_| "unknown".into()),
            repository: std::env::var("GITHUB_REPOSITORY").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisSummary {
    pub output_dir: PathBuf,
    pub results: Vec<FileAnalysis>,
    pub vulnerabilities: usize,
    pub performance_issues: usize,
    pub average_score: f64,
}

/// Reads a newline-separated path list, skipping blanks. Missing file → `None`.
pub fn read_path_list(path: &Path) -> AnalyzerResult<Option<Vec<String>>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))?;
    Ok(Some(
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
    ))
}

/// Analyzes one file on disk; unreadable or missing files yield `None`.
pub fn analyze_file(workdir: &Path, rel: &str) -> Option<FileAnalysis> {
    let full = workdir.join(rel);
    match fs::read(&full) {
        Ok(bytes) => Some(analyze_source(rel, &String::from_utf8_lossy(&bytes))),
        Err(e) => {
            warn!(file = %rel, error = %e, "skipping unreadable file");
            None
        }
    }
}

/// Runs the analysis and writes:
/// - `<output_root>/<YYYYmmdd-HHMMSS>_<sha7>/results.json` and `report.md`
/// - copies at `<workdir>/analysis_results.json` and `analysis_report.md`
///
/// Returns `None` when there is nothing to analyze.
pub fn run(cfg: &AnalyzerConfig, now: DateTime<Local>) -> AnalyzerResult<Option<AnalysisSummary>> {
    let list_path = cfg.workdir.join(&cfg.changed_files);
    let Some(changed) = read_path_list(&list_path)? else {
        info!("no changed files detected");
        return Ok(None);
    };

    let code_files: Vec<&String> = changed.iter().filter(|f| is_code_file(f)).collect();
    if code_files.is_empty() {
        info!("no code files to analyze");
        return Ok(None);
    }
    info!(files = code_files.len(), "analyzing changed files");

    let results: Vec<FileAnalysis> = code_files
        .iter()
        .filter_map(|f| analyze_file(&cfg.workdir, f))
        .inspect(|r| {
            let s = &r.quality_score;
            info!(
                file = %r.file,
                total = s.total,
                grade = %s.grade,
                documentation = s.documentation,
                complexity = s.complexity,
                maintainability = s.maintainability,
                security = r.security_vulnerabilities.len(),
                performance = r.performance_issues.len(),
                "file analyzed"
            );
        })
        .collect();

    let sha7: String = cfg.commit_sha.chars().take(7).collect();
    let dir = cfg
        .workdir
        .join(&cfg.output_root)
        .join(format!("{}_{}", now.format("%Y%m%d-%H%M%S"), sha7));
    fs::create_dir_all(&dir).map_err(|e| AnalyzerError::io(&dir, e))?;

    let ctx = ReportContext {
        commit_sha: cfg.commit_sha.clone(),
        repository: cfg.repository.clone(),
        generated_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
    };

    let json = serde_json::to_string_pretty(&results)?;
    let markdown = render_markdown(&results, &ctx);

    let writes = [
        (dir.join("results.json"), &json),
        (dir.join("report.md"), &markdown),
        (cfg.workdir.join("analysis_results.json"), &json),
        (cfg.workdir.join("analysis_report.md"), &markdown),
    ];
    for (path, body) in writes {
        fs::write(&path, body).map_err(|e| AnalyzerError::io(&path, e))?;
    }

    let summary = AnalysisSummary {
        vulnerabilities: results.iter().map(|r| r.security_vulnerabilities.len()).sum(),
        performance_issues: results.iter().map(|r| r.performance_issues.len()).sum(),
        average_score: average_score(&results),
        output_dir: dir,
        results,
    };
    info!(
        files = summary.results.len(),
        vulnerabilities = summary.vulnerabilities,
        performance_issues = summary.performance_issues,
        dir = %summary.output_dir.display(),
        "analysis complete"
    );
    Ok(Some(summary))
}
