//! Per-file docs, breaking changes and changelog for the files in
//! `changed_files.txt`.

use std::process::ExitCode;

use ai_llm_service::LlmClient;
use ai_llm_service::config::default_config::config_from_env;
use doc_generator::{BREAKING_LABEL, DocGenConfig, DocGenOutcome, RevisionSource};
use git_context_engine::{GitCli, GitHubClient, GitHubConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    pr_scribe::load_dotenv();
    pr_scribe::telemetry::init();
    pr_scribe::exit_with(run().await)
}

async fn run() -> anyhow::Result<()> {
    let llm = LlmClient::new(config_from_env()?)?;
    if !llm.is_configured() {
        warn!("GROQ_API_KEY not set; pages will carry a placeholder instead of generated docs");
    }
    let cfg = DocGenConfig::from_env();
    let revisions = RevisionSource::Git(GitCli::new(&cfg.workdir));
    let today = chrono::Local::now().date_naive();

    let Some(outcome) = doc_generator::run(&cfg, &llm, &revisions, today).await? else {
        return Ok(());
    };
    info!(
        docs = outcome.docs.len(),
        breaking = outcome.breaking_changes.len(),
        changelog = outcome.changelog_entries.len(),
        "documentation generated"
    );
    label_breaking(&outcome).await;
    Ok(())
}

/// Adds the breaking-change label when asked to (`LABEL_BREAKING=true`)
/// and a PR and token are available. Failure only warns.
async fn label_breaking(outcome: &DocGenOutcome) {
    if !outcome.has_breaking {
        return;
    }
    let wanted = std::env::var("LABEL_BREAKING").is_ok_and(|v| v.eq_ignore_ascii_case("true"));
    let pr = std::env::var("PR_NUMBER").ok().and_then(|n| n.trim().parse::<u64>().ok());
    let Some(pr) = pr.filter(|_| wanted) else {
        return;
    };
    let gh = match GitHubClient::from_config(GitHubConfig::from_env()) {
        Ok(gh) => gh,
        Err(e) => {
            warn!(error = %e, "cannot label PR");
            return;
        }
    };
    match gh.add_labels(pr, &[BREAKING_LABEL]).await {
        Ok(()) => info!(pr, label = BREAKING_LABEL, "PR labeled"),
        Err(e) => warn!(pr, error = %e, "labeling failed"),
    }
}
