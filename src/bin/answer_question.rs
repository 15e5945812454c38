//! Answers a question asked in a PR comment into `bot_response.md`.

use std::process::ExitCode;

use ai_llm_service::LlmClient;
use ai_llm_service::config::default_config::config_from_env;
use pr_bot::{BotConfig, CommentContext, question};
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    pr_scribe::load_dotenv();
    pr_scribe::telemetry::init();
    pr_scribe::exit_with(run().await)
}

async fn run() -> anyhow::Result<()> {
    let llm = LlmClient::new(config_from_env()?)?;
    let comment = CommentContext::from_env();
    if question::run(&BotConfig::default(), &comment, &llm).await?.is_some() {
        info!(user = %comment.user, "response written");
    }
    Ok(())
}
