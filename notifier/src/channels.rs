//! Delivery to the configured chat channels.
//!
//! Each channel has its own success status: Discord webhooks answer 204,
//! Slack webhooks and Pushbullet answer 200. Anything else is a failure.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::errors::{NotifierError, NotifierResult};

pub const PUSHBULLET_API_URL: &str = "https://api.pushbullet.com/v2/pushes";

pub const DISCORD_CONTENT_LIMIT: usize = 2000;
pub const DISCORD_FIELD_LIMIT: usize = 1024;
pub const DISCORD_TITLE_LIMIT: usize = 256;
pub const SLACK_TEXT_LIMIT: usize = 3000;
pub const PUSHBULLET_TITLE_LIMIT: usize = 250;
pub const PUSHBULLET_BODY_LIMIT: usize = 4000;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Discord,
    Slack,
    Pushbullet,
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Channel::Discord => "Discord",
            Channel::Slack => "Slack",
            Channel::Pushbullet => "Pushbullet",
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotifierConfig {
    pub discord_webhook: Option<String>,
    pub slack_webhook: Option<String>,
    pub pushbullet_token: Option<String>,
    /// Override for tests; defaults to [`PUSHBULLET_API_URL`].
    pub pushbullet_url: Option<String>,
}

impl NotifierConfig {
    /// Reads `DISCORD_WEBHOOK_URL`, `SLACK_WEBHOOK_URL`, `PUSHBULLET_TOKEN`
    /// and `PUSHBULLET_API_URL`. Blank values count as unset.
    pub fn from_env() -> Self {
        let non_empty = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
        Self {
            discord_webhook: non_empty("DISCORD_WEBHOOK_URL"),
            slack_webhook: non_empty("SLACK_WEBHOOK_URL"),
            pushbullet_token: non_empty("PUSHBULLET_TOKEN"),
            pushbullet_url: non_empty("PUSHBULLET_API_URL"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.discord_webhook.is_none() && self.slack_webhook.is_none() && self.pushbullet_token.is_none()
    }
}

/// One message rendered for every channel.
#[derive(Debug, Clone)]
pub struct Message {
    pub discord: Value,
    pub slack: Value,
    pub push_title: String,
    pub push_body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub results: Vec<(Channel, bool)>,
}

impl DeliveryReport {
    pub fn nothing_configured(&self) -> bool {
        self.results.is_empty()
    }

    /// At least one channel was tried and none succeeded.
    pub fn all_failed(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|(_, ok)| !ok)
    }

    pub fn sent(&self) -> usize {
        self.results.iter().filter(|(_, ok)| *ok).count()
    }
}

#[derive(Debug, Clone)]
pub struct Notifier {
    http: Client,
    cfg: NotifierConfig,
}

impl Notifier {
    pub fn new(cfg: NotifierConfig) -> NotifierResult<Self> {
        let http = Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self { http, cfg })
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.cfg
    }

    async fn post(
        &self,
        channel: Channel,
        url: &str,
        payload: &Value,
        token: Option<&str>,
        expected: StatusCode,
    ) -> NotifierResult<()> {
        let mut req = self.http.post(url).json(payload);
        if let Some(t) = token {
            req = req.header("Access-Token", t);
        }
        let resp = req
            .send()
            .await
            .map_err(|source| NotifierError::Transport { channel, source })?;
        let status = resp.status();
        if status != expected {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifierError::Status { channel, status, body });
        }
        debug!(%channel, %status, "delivered");
        Ok(())
    }

    pub async fn send_discord(&self, url: &str, payload: &Value) -> NotifierResult<()> {
        self.post(Channel::Discord, url, payload, None, StatusCode::NO_CONTENT).await
    }

    pub async fn send_slack(&self, url: &str, payload: &Value) -> NotifierResult<()> {
        self.post(Channel::Slack, url, payload, None, StatusCode::OK).await
    }

    /// Pushes a `note`; title and body are cut to Pushbullet's limits.
    pub async fn send_pushbullet(&self, token: &str, title: &str, body: &str) -> NotifierResult<()> {
        let url = self.cfg.pushbullet_url.as_deref().unwrap_or(PUSHBULLET_API_URL);
        let payload = pushbullet_note(title, body);
        self.post(Channel::Pushbullet, url, &payload, Some(token), StatusCode::OK).await
    }

    /// Sends `msg` to every configured channel, one after another. Failures
    /// are logged and recorded, never returned.
    pub async fn broadcast(&self, msg: &Message) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        if let Some(url) = &self.cfg.discord_webhook {
            let r = self.send_discord(url, &msg.discord).await;
            report.results.push((Channel::Discord, log_result(Channel::Discord, r)));
        }
        if let Some(url) = &self.cfg.slack_webhook {
            let r = self.send_slack(url, &msg.slack).await;
            report.results.push((Channel::Slack, log_result(Channel::Slack, r)));
        }
        if let Some(token) = &self.cfg.pushbullet_token {
            let r = self.send_pushbullet(token, &msg.push_title, &msg.push_body).await;
            report.results.push((Channel::Pushbullet, log_result(Channel::Pushbullet, r)));
        }

        if report.nothing_configured() {
            warn!("no notification channels configured");
        } else {
            info!(sent = report.sent(), tried = report.results.len(), "notifications done");
        }
        report
    }
}

fn log_result(channel: Channel, r: NotifierResult<()>) -> bool {
    match r {
        Ok(()) => {
            info!(%channel, "notification sent");
            true
        }
        Err(e) => {
            warn!(%channel, error = %e, "notification failed");
            false
        }
    }
}

pub fn pushbullet_note(title: &str, body: &str) -> Value {
    json!({
        "type": "note",
        "title": crate::text::truncate(title, PUSHBULLET_TITLE_LIMIT),
        "body": crate::text::truncate(body, PUSHBULLET_BODY_LIMIT),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_outcomes() {
        assert!(DeliveryReport::default().nothing_configured());
        assert!(!DeliveryReport::default().all_failed());
        let mixed = DeliveryReport {
            results: vec![(Channel::Discord, false), (Channel::Slack, true)],
        };
        assert!(!mixed.all_failed());
        assert_eq!(mixed.sent(), 1);
        let failed = DeliveryReport {
            results: vec![(Channel::Pushbullet, false)],
        };
        assert!(failed.all_failed());
    }

    #[test]
    fn pushbullet_note_is_bounded() {
        let note = pushbullet_note(&"t".repeat(300), "body");
        assert_eq!(note["type"], "note");
        assert_eq!(note["title"].as_str().unwrap().chars().count(), PUSHBULLET_TITLE_LIMIT);
        assert_eq!(note["body"], "body");
    }
}
