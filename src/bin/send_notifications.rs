//! Post-merge summary to Discord, Slack and Pushbullet.

use std::path::Path;
use std::process::ExitCode;

use anyhow::bail;
use git_context_engine::GitCli;
use notifier::{CommitInfo, Notifier, NotifierConfig, WorkflowData, send_push_summary};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    pr_scribe::load_dotenv();
    pr_scribe::telemetry::init();
    pr_scribe::exit_with(run().await)
}

async fn run() -> anyhow::Result<()> {
    let cfg = NotifierConfig::from_env();
    if cfg.is_empty() {
        warn!("no webhook or token configured; nothing to send");
        return Ok(());
    }

    let message = match GitCli::new(".").last_commit_message().await {
        Ok(m) => Some(m),
        Err(e) => {
            warn!(error = %e, "git log unavailable, using COMMIT_MESSAGE");
            None
        }
    };
    let commit = CommitInfo::from_env(message);
    let data = WorkflowData::load(Path::new(".")).await?;

    let notifier = Notifier::new(cfg)?;
    let report = send_push_summary(&notifier, &commit, &data, chrono::Utc::now()).await;
    if report.all_failed() {
        bail!("every notification channel failed");
    }
    info!(sent = report.sent(), "summary delivered");
    Ok(())
}
