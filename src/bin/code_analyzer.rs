//! Quality, security and performance report for the changed files.

use std::process::ExitCode;

use code_analyzer::AnalyzerConfig;
use tracing::info;

fn main() -> ExitCode {
    pr_scribe::load_dotenv();
    pr_scribe::telemetry::init();
    pr_scribe::exit_with(run())
}

fn run() -> anyhow::Result<()> {
    let cfg = AnalyzerConfig::from_env();
    if let Some(summary) = code_analyzer::run(&cfg, chrono::Local::now())? {
        info!(
            files = summary.results.len(),
            average = summary.average_score,
            vulnerabilities = summary.vulnerabilities,
            performance = summary.performance_issues,
            output = %summary.output_dir.display(),
            "analysis complete"
        );
    }
    Ok(())
}
