//! Routes generated docs to GitHub Wiki pages under `wiki_updates/`.

use std::process::ExitCode;

use ai_llm_service::LlmClient;
use ai_llm_service::config::default_config::config_from_env;
use doc_router::WikiConfig;
use git_context_engine::{GitHubClient, GitHubConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    pr_scribe::load_dotenv();
    pr_scribe::telemetry::init();
    pr_scribe::exit_with(run().await)
}

async fn existing_pages() -> Vec<String> {
    let cfg = GitHubConfig::from_env();
    if cfg.token.is_none() {
        return Vec::new();
    }
    let pages = match GitHubClient::from_config(cfg) {
        Ok(gh) => gh.list_wiki_pages().await,
        Err(e) => Err(e),
    };
    pages.unwrap_or_else(|e| {
        warn!(error = %e, "could not list wiki pages");
        Vec::new()
    })
}

async fn run() -> anyhow::Result<()> {
    let llm = LlmClient::new(config_from_env()?)?;
    if !llm.is_configured() {
        warn!("GROQ_API_KEY not set; using path-based page names");
    }
    let pages = existing_pages().await;
    info!(existing = pages.len(), "wiki pages known");

    let now = chrono::Local::now().naive_local();
    if let Some(outcome) = doc_router::wiki::run(WikiConfig::default(), &llm, pages, now).await? {
        info!(updates = outcome.updates.len(), "wiki updates prepared");
    }
    Ok(())
}
