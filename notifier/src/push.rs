//! Summary of a push to the main branch: commit, breaking changes, files,
//! wiki pages, changelog.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::channels::{
    DISCORD_FIELD_LIMIT, DISCORD_TITLE_LIMIT, DeliveryReport, Message, Notifier, SLACK_TEXT_LIMIT,
};
use crate::text::{bounded_list, clean_commit_message, commit_title, file_name, truncate};
use crate::workflow::WorkflowData;

const BOT_AVATAR: &str = "https://github.githubassets.com/images/modules/logos_page/GitHub-Mark.png";
const COLOR_BREAKING: u32 = 0xFF6B35;
const COLOR_OK: u32 = 0x4CAF50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// `owner/repo`.
    pub repo: String,
    pub sha: String,
    pub actor: String,
    pub message: String,
    pub run_url: String,
    pub server_url: String,
}

impl CommitInfo {
    /// From the Actions environment. `message` is the raw `git log -1` text,
    /// falling back to `COMMIT_MESSAGE`.
    pub fn from_env(message: Option<String>) -> Self {
        let var = |k: &str, d: &str| {
            std::env::var(k)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| d.to_string())
        };
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| var("COMMIT_MESSAGE", "No message"));
        Self::new(
            &var("GITHUB_REPOSITORY", "Unknown Repo"),
            &var("GITHUB_SHA", "unknown"),
            &var("GITHUB_ACTOR", "Unknown"),
            &message,
            &var("GITHUB_RUN_ID", ""),
            &var("GITHUB_SERVER_URL", "https://github.com"),
        )
    }

    pub fn new(repo: &str, sha: &str, actor: &str, message: &str, run_id: &str, server_url: &str) -> Self {
        let server_url = server_url.trim_end_matches('/').to_string();
        Self {
            repo: repo.to_string(),
            sha: sha.chars().take(7).collect(),
            actor: actor.to_string(),
            message: clean_commit_message(message),
            run_url: format!("{server_url}/{repo}/actions/runs/{run_id}"),
            server_url,
        }
    }

    fn repo_name(&self) -> &str {
        self.repo.rsplit('/').next().unwrap_or(&self.repo)
    }

    fn wiki_url(&self) -> String {
        format!("{}/{}/wiki", self.server_url, self.repo)
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Emoji for the title: breaking first, then the commit kind.
pub fn title_emoji(title: &str, breaking: bool) -> &'static str {
    let t = title.to_lowercase();
    if breaking {
        "⚠️"
    } else if contains_any(&t, &["feat", "feature", "add"]) {
        "✨"
    } else if contains_any(&t, &["fix", "bug"]) {
        "🐛"
    } else if contains_any(&t, &["docs", "documentation"]) {
        "📚"
    } else {
        "📝"
    }
}

fn headline(commit: &CommitInfo, data: &WorkflowData) -> String {
    let title = commit_title(&commit.message);
    format!("{} {title}", title_emoji(&title, !data.breaking_changes.is_empty()))
}

pub fn discord_summary(commit: &CommitInfo, data: &WorkflowData, now: DateTime<Utc>) -> Value {
    let breaking = !data.breaking_changes.is_empty();
    let mut fields = Vec::new();

    if breaking {
        let lines: Vec<String> = data
            .breaking_changes
            .iter()
            .map(|b| format!("⚠️ **{}**: {}", b.symbol, b.message))
            .collect();
        let text = bounded_list(&lines, 5, "\n", |n| format!("\n... and {n} more"));
        fields.push(json!({
            "name": "🚨 Breaking Changes Detected",
            "value": truncate(&text, DISCORD_FIELD_LIMIT),
            "inline": false,
        }));
    }

    if !data.changed_files.is_empty() {
        let lines: Vec<String> = data.changed_files.iter().map(|f| format!("• `{}`", file_name(f))).collect();
        let text = bounded_list(&lines, 10, "\n", |n| format!("\n... and {n} more"));
        fields.push(json!({
            "name": format!("📄 Files Changed ({})", data.changed_files.len()),
            "value": truncate(&text, DISCORD_FIELD_LIMIT),
            "inline": true,
        }));
    }

    if !data.wiki_pages.is_empty() {
        let wiki = commit.wiki_url();
        let lines: Vec<String> = data.wiki_pages.iter().map(|p| format!("• [{p}]({wiki}/{p})")).collect();
        let text = bounded_list(&lines, 8, "\n", |n| format!("\n... and {n} more"));
        fields.push(json!({
            "name": format!("📚 Wiki Pages Updated ({})", data.wiki_pages.len()),
            "value": truncate(&text, DISCORD_FIELD_LIMIT),
            "inline": true,
        }));
    }

    if !data.changelog_entries.is_empty() {
        let text: String = data
            .changelog_entries
            .iter()
            .take(3)
            .map(|e| format!("**{}**\n{}\n\n", e.file, e.content.chars().take(200).collect::<String>()))
            .collect();
        fields.push(json!({
            "name": "📋 Changelog Preview",
            "value": truncate(&text, DISCORD_FIELD_LIMIT),
            "inline": false,
        }));
    }

    fields.push(json!({
        "name": "🔗 Links",
        "value": format!("[View Workflow Run]({}) • [View Wiki]({})", commit.run_url, commit.wiki_url()),
        "inline": false,
    }));

    json!({
        "username": "CI/CD Bot",
        "avatar_url": BOT_AVATAR,
        "embeds": [{
            "title": truncate(&headline(commit, data), DISCORD_TITLE_LIMIT),
            "description": format!("**{}** • `{}`", commit.repo_name(), commit.sha),
            "color": if breaking { COLOR_BREAKING } else { COLOR_OK },
            "timestamp": now.to_rfc3339(),
            "footer": { "text": format!("by {}", commit.actor) },
            "fields": fields,
        }],
    })
}

fn mrkdwn(text: &str) -> Value {
    json!({ "type": "mrkdwn", "text": truncate(text, SLACK_TEXT_LIMIT) })
}

pub fn slack_summary(commit: &CommitInfo, data: &WorkflowData) -> Value {
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": { "type": "plain_text", "text": headline(commit, data) },
        }),
        json!({
            "type": "section",
            "text": mrkdwn(&format!(
                "*Commit:* `{}`\n*By:* {}\n*Message:* {}",
                commit.sha, commit.actor, commit.message
            )),
        }),
    ];

    if !data.breaking_changes.is_empty() {
        let lines: Vec<String> = data
            .breaking_changes
            .iter()
            .take(5)
            .map(|b| format!("⚠️ *{}*: {}", b.symbol, b.message))
            .collect();
        blocks.push(json!({
            "type": "section",
            "text": mrkdwn(&format!("*🚨 Breaking Changes Detected*\n{}", lines.join("\n"))),
        }));
    }

    let mut fields = Vec::new();
    if !data.changed_files.is_empty() {
        let names: Vec<String> = data.changed_files.iter().map(|f| format!("`{}`", file_name(f))).collect();
        let list = bounded_list(&names, 5, ", ", |n| format!(" +{n} more"));
        fields.push(mrkdwn(&format!("*Files:* {list}")));
    }
    if !data.wiki_pages.is_empty() {
        let list = bounded_list(&data.wiki_pages, 5, ", ", |n| format!(" +{n} more"));
        fields.push(mrkdwn(&format!("*Wiki Pages:* {list}")));
    }
    if !fields.is_empty() {
        blocks.push(json!({ "type": "section", "fields": fields }));
    }

    blocks.push(json!({
        "type": "actions",
        "elements": [
            { "type": "button", "text": { "type": "plain_text", "text": "View Workflow" }, "url": commit.run_url },
            { "type": "button", "text": { "type": "plain_text", "text": "View Wiki" }, "url": commit.wiki_url() },
        ],
    }));

    json!({ "blocks": blocks })
}

pub fn pushbullet_summary(commit: &CommitInfo, data: &WorkflowData) -> (String, String) {
    let mut body = format!(
        "{} • {} by {}\n\n{}\n",
        commit.repo_name(),
        commit.sha,
        commit.actor,
        commit.message
    );
    if !data.breaking_changes.is_empty() {
        body.push_str("\nBreaking changes:\n");
        for b in data.breaking_changes.iter().take(5) {
            body.push_str(&format!("- {}: {}\n", b.symbol, b.message));
        }
    }
    if !data.changed_files.is_empty() {
        let names: Vec<String> = data.changed_files.iter().map(|f| file_name(f).to_string()).collect();
        let list = bounded_list(&names, 10, ", ", |n| format!(" +{n} more"));
        body.push_str(&format!("\nFiles ({}): {list}\n", data.changed_files.len()));
    }
    if !data.wiki_pages.is_empty() {
        let list = bounded_list(&data.wiki_pages, 5, ", ", |n| format!(" +{n} more"));
        body.push_str(&format!("Wiki: {list}\n"));
    }
    body.push_str(&format!("\n{}", commit.run_url));
    (headline(commit, data), body)
}

/// Renders the push summary for every channel and sends it.
pub async fn send_push_summary(
    notifier: &Notifier,
    commit: &CommitInfo,
    data: &WorkflowData,
    now: DateTime<Utc>,
) -> DeliveryReport {
    let (push_title, push_body) = pushbullet_summary(commit, data);
    let msg = Message {
        discord: discord_summary(commit, data, now),
        slack: slack_summary(commit, data),
        push_title,
        push_body,
    };
    notifier.broadcast(&msg).await
}
