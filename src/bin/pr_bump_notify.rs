//! Alerts the team when a PR comment asks for review.

use std::process::ExitCode;

use anyhow::bail;
use notifier::{BumpContext, Notifier, NotifierConfig, send_bump};
use tracing::warn;

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
    let notifier = Notifier::new(cfg)?;
    let ctx = BumpContext::from_env();
    if let Some(report) = send_bump(&notifier, &ctx, chrono::Utc::now()).await {
        if report.all_failed() {
            bail!("every notification channel failed");
        }
    }
    Ok(())
}
