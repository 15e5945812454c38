//! Routes generated docs into the GitHub Pages site under `docs-site/`.

use std::process::ExitCode;

use ai_llm_service::LlmClient;
use ai_llm_service::config::default_config::config_from_env;
use doc_router::PagesConfig;
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
        warn!("GROQ_API_KEY not set; using keyword-based placement");
    }
    let now = chrono::Local::now().naive_local();
    if let Some(outcome) = doc_router::pages::run(PagesConfig::from_env(), &llm, now).await? {
        info!(changes = outcome.changes.len(), "pages updated");
    }
    Ok(())
}
