//! Acts on change requests in PR comments: classify, confirm, edit, commit.

use std::process::ExitCode;

use ai_llm_service::LlmClient;
use ai_llm_service::config::default_config::config_from_env;
use git_context_engine::GitCli;
use pr_bot::{BotConfig, CommentContext, agent};
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    pr_scribe::load_dotenv();
    pr_scribe::telemetry::init();
    pr_scribe::exit_with(run().await)
}

async fn run() -> anyhow::Result<()> {
    let llm = LlmClient::new(config_from_env()?)?;
    let cfg = BotConfig::default();
    let comment = CommentContext::from_env();
    let git = GitCli::new(&cfg.workdir);

    let outcome = agent::run(&cfg, &comment, &llm, &git).await?;
    info!(user = %comment.user, ?outcome, "agentic bot finished");
    Ok(())
}
