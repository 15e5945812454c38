//! Alerts the team when a PR comment asks for review ("bump", "PTAL", ...).

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Value, json};
use tracing::info;

use crate::channels::{
    DISCORD_CONTENT_LIMIT, DISCORD_FIELD_LIMIT, DISCORD_TITLE_LIMIT, DeliveryReport, Message, Notifier,
    SLACK_TEXT_LIMIT,
};
use crate::text::truncate;

const BOT_AVATAR: &str = "https://github.githubassets.com/images/modules/logos_page/GitHub-Mark.png";
const COLOR_URGENT: u32 = 0xFF4444;
const COLOR_NORMAL: u32 = 0xFFA500;
const URGENT_WORDS: &[&str] = &["urgent", "blocked", "priority", "critical"];

lazy_static! {
    static ref BUMP_PATTERNS: Vec<Regex> = [
        r"\bbump\b",
        r"\bping\b",
        r"\battention\b",
        r"\breview\s+needed\b",
        r"\bneeds\s+review\b",
        r"\bplease\s+review\b",
        r"\bready\s+for\s+review\b",
        r"\br4r\b",
        r"\bptal\b",
        r"\blgtm\?",
        r"\banyone\s+available\b",
        r"\bhelp\s+needed\b",
        r"\bblocked\b",
        r"\burgent\b",
        r"\bpriority\b",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
    .collect();
}

pub fn is_bump_comment(comment: &str) -> bool {
    BUMP_PATTERNS.iter().any(|re| re.is_match(comment))
}

pub fn is_urgent(comment: &str) -> bool {
    let lower = comment.to_lowercase();
    URGENT_WORDS.iter().any(|w| lower.contains(w))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpContext {
    pub pr_number: String,
    pub pr_title: String,
    pub pr_url: String,
    pub repo_name: String,
    pub comment: String,
    pub user: String,
}

impl BumpContext {
    /// Reads `PR_NUMBER`, `PR_TITLE`, `PR_URL`, `REPO_NAME`, `COMMENT_BODY`
    /// and `COMMENT_USER`.
    pub fn from_env() -> Self {
        let var = |k: &str, d: &str| {
            std::env::var(k)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| d.to_string())
        };
        Self {
            pr_number: var("PR_NUMBER", "0"),
            pr_title: var("PR_TITLE", "Unknown PR"),
            pr_url: var("PR_URL", ""),
            repo_name: var("REPO_NAME", "Unknown Repo"),
            comment: var("COMMENT_BODY", ""),
            user: var("COMMENT_USER", "Unknown"),
        }
    }

    fn title(&self) -> String {
        format!("🔔 PR Review Requested - #{}", self.pr_number)
    }
}

pub fn discord_bump(ctx: &BumpContext, now: DateTime<Utc>) -> Value {
    let urgent = is_urgent(&ctx.comment);
    let mut fields = vec![
        json!({
            "name": "💬 Comment",
            "value": truncate(&format!("_{}_", ctx.comment), DISCORD_FIELD_LIMIT),
            "inline": false,
        }),
        json!({ "name": "📂 Repository", "value": truncate(&ctx.repo_name, DISCORD_FIELD_LIMIT), "inline": true }),
        json!({ "name": "🔗 Link", "value": format!("[View PR]({})", ctx.pr_url), "inline": true }),
    ];
    if urgent {
        fields.insert(
            0,
            json!({
                "name": "⚠️ Urgency",
                "value": "This PR is marked as urgent/blocked/priority",
                "inline": false,
            }),
        );
    }

    let mut payload = json!({
        "username": "PR Review Bot",
        "avatar_url": BOT_AVATAR,
        "embeds": [{
            "title": truncate(&ctx.title(), DISCORD_TITLE_LIMIT),
            "description": truncate(&format!("**{}**", ctx.pr_title), DISCORD_CONTENT_LIMIT),
            "color": if urgent { COLOR_URGENT } else { COLOR_NORMAL },
            "timestamp": now.to_rfc3339(),
            "author": {
                "name": ctx.user,
                "icon_url": format!("https://github.com/{}.png", ctx.user),
            },
            "fields": fields,
        }],
    });
    if urgent {
        payload["content"] = json!("@here");
    }
    payload
}

pub fn slack_bump(ctx: &BumpContext) -> Value {
    let urgent = is_urgent(&ctx.comment);
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": { "type": "plain_text", "text": ctx.title() },
        }),
        json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": truncate(&format!("*{}*\n\n_{}_", ctx.pr_title, ctx.comment), SLACK_TEXT_LIMIT),
            },
            "accessory": {
                "type": "image",
                "image_url": format!("https://github.com/{}.png", ctx.user),
                "alt_text": ctx.user,
            },
        }),
    ];
    if urgent {
        blocks.insert(
            1,
            json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": "⚠️ *This PR is marked as urgent/blocked/priority*" },
            }),
        );
    }
    blocks.push(json!({
        "type": "context",
        "elements": [{
            "type": "mrkdwn",
            "text": format!("*Repository:* {} | *Requested by:* {}", ctx.repo_name, ctx.user),
        }],
    }));

    let mut button = json!({
        "type": "button",
        "text": { "type": "plain_text", "text": "View PR" },
        "url": ctx.pr_url,
    });
    if urgent {
        button["style"] = json!("primary");
    }
    blocks.push(json!({ "type": "actions", "elements": [button] }));

    let mut payload = json!({ "blocks": blocks });
    if urgent {
        payload["text"] = json!(format!("<!here> Urgent PR Review: {}", ctx.pr_title));
    }
    payload
}

pub fn pushbullet_bump(ctx: &BumpContext) -> (String, String) {
    let mut body = String::new();
    if is_urgent(&ctx.comment) {
        body.push_str("⚠️ Marked as urgent/blocked/priority\n\n");
    }
    body.push_str(&format!(
        "{}\n\n{}: \"{}\"\n\n{}\n{}",
        ctx.pr_title, ctx.user, ctx.comment, ctx.repo_name, ctx.pr_url
    ));
    (ctx.title(), body)
}

/// Sends the bump alert; `None` when the comment is not a bump.
pub async fn send_bump(notifier: &Notifier, ctx: &BumpContext, now: DateTime<Utc>) -> Option<DeliveryReport> {
    if !is_bump_comment(&ctx.comment) {
        info!(pr = %ctx.pr_number, "comment has no bump keywords");
        return None;
    }
    info!(pr = %ctx.pr_number, user = %ctx.user, urgent = is_urgent(&ctx.comment), "bump detected");
    let (push_title, push_body) = pushbullet_bump(ctx);
    let msg = Message {
        discord: discord_bump(ctx, now),
        slack: slack_bump(ctx),
        push_title,
        push_body,
    };
    Some(notifier.broadcast(&msg).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ctx(comment: &str) -> BumpContext {
        BumpContext {
            pr_number: "12".into(),
            pr_title: "Add login".into(),
            pr_url: "https://github.com/acme/shop/pull/12".into(),
            repo_name: "acme/shop".into(),
            comment: comment.into(),
            user: "dev".into(),
        }
    }

    #[test]
    fn bump_keywords_are_case_insensitive_and_word_bounded() {
        assert!(is_bump_comment("Bump"));
        assert!(is_bump_comment("PTAL when you can"));
        assert!(is_bump_comment("this is ready   for review"));
        assert!(is_bump_comment("r4r"));
        assert!(is_bump_comment("lgtm?"));
        assert!(!is_bump_comment("bumpy road"));
        assert!(!is_bump_comment("looks good to me"));
    }

    #[test]
    fn urgency_is_a_substring_match() {
        assert!(is_urgent("this is CRITICAL"));
        assert!(is_urgent("we are blocked"));
        assert!(!is_urgent("bump"));
    }

    #[test]
    fn urgent_discord_payload_pings_here() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let p = discord_bump(&ctx("bump, urgent"), now);
        assert_eq!(p["content"], "@here");
        assert_eq!(p["embeds"][0]["color"], COLOR_URGENT);
        assert_eq!(p["embeds"][0]["fields"][0]["name"], "⚠️ Urgency");
        assert_eq!(p["embeds"][0]["title"], "🔔 PR Review Requested - #12");

        let p = discord_bump(&ctx("bump"), now);
        assert!(p.get("content").is_none());
        assert_eq!(p["embeds"][0]["color"], COLOR_NORMAL);
        assert_eq!(p["embeds"][0]["fields"][0]["value"], "_bump_");
    }

    #[test]
    fn slack_button_style_only_when_urgent() {
        let p = slack_bump(&ctx("ping"));
        let blocks = p["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 4);
        assert!(blocks[3]["elements"][0].get("style").is_none());
        assert!(p.get("text").is_none());

        let p = slack_bump(&ctx("ping, blocked"));
        let blocks = p["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[4]["elements"][0]["style"], "primary");
        assert_eq!(p["text"], "<!here> Urgent PR Review: Add login");
    }
}
