//! Edit requests from the PR author or assignees.
//!
//! A clear request is executed at once; an ambiguous one is parked in
//! `pending_action.json` until the requester confirms or cancels it.
//! Every outcome leaves a markdown reply in `bot_response.md`, except a
//! plain question, which is left to the question bot.

use std::fmt::Write as _;
use std::path::Path;

use ai_llm_service::{LlmClient, ModelProfile};
use git_context_engine::GitCli;
use tracing::{info, warn};

use crate::context::{BotConfig, CommentContext, is_authorized, load_code_files, read_pr_files};
use crate::edits::{apply_edits, parse_code_changes};
use crate::errors::PrBotResult;
use crate::intent::{IntentCategory, classify_intent};
use crate::pending::{PendingAction, Reply, classify_reply};

const EDIT_SYSTEM: &str =
    "You are a helpful code editing assistant. Make the requested changes and output complete modified files.";
const COMMIT_ACTION_MAX: usize = 100;
pub const BOT_IDENTITY: (&str, &str) = ("github-actions[bot]", "github-actions[bot]@users.noreply.github.com");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutcome {
    Unauthorized,
    /// Nothing to do: a question, or an unrelated comment.
    NoAction,
    NoFiles,
    AwaitingConfirmation,
    Cancelled,
    GenerationFailed,
    NothingApplied,
    Committed { hash: String, files: Vec<String> },
    CommitFailed,
}

pub fn commit_message(action: &str) -> String {
    let short: String = action.trim().chars().take(COMMIT_ACTION_MAX).collect();
    format!("bot: {short}")
}

fn edit_prompt(action: &str, files: &[(String, String)]) -> String {
    let mut context = String::from("PR Files:\n\n");
    for (path, content) in files {
        let _ = write!(context, "## {path}\n```\n{content}\n```\n\n");
    }
    format!(
        "You are a code editor bot. Make the requested changes to the code files.\n\n\
         {context}\n\
         User request: {action}\n\n\
         Generate the COMPLETE modified files. For each file you modify, output:\n\n\
         FILE: <filepath>\n```\n<complete file content with changes>\n```\n\n\
         CHANGES:\n- Brief description of what you changed\n\n\
         Only output files that need changes. Keep the same style and formatting as original code."
    )
}

/// Raw model output with `FILE:` blocks, or `None` when there is no code to
/// edit or the call failed.
pub async fn generate_code_changes(
    llm: &LlmClient,
    workdir: &Path,
    action: &str,
    files: &[String],
) -> Option<String> {
    let loaded = load_code_files(workdir, files).await;
    if loaded.is_empty() {
        warn!("no editable code files in the PR");
        return None;
    }
    let req = llm
        .request(ModelProfile::Slow, EDIT_SYSTEM, &edit_prompt(action, &loaded))
        .temperature(0.2)
        .max_tokens(4000)
        .timeout_secs(60)
        .no_cache();
    match llm.call_chat(&req).await {
        Ok(out) => Some(out),
        Err(e) => {
            warn!(error = %e, "code change generation failed");
            None
        }
    }
}

pub mod responses {
    use std::fmt::Write as _;
    use std::path::Path;

    use crate::edits::ProposedChanges;

    pub fn unauthorized(user: &str, author: &str) -> String {
        format!(
            "## 🔒 Authorization Required\n\n\
             @{user}, only the PR author (@{author}) or assignees can request code changes.\n\n\
             If you'd like to suggest changes, please comment your suggestions and the author can implement them."
        )
    }

    pub fn confirmation(user: &str, action: &str) -> String {
        format!(
            "## 🤔 Confirmation Needed\n\n\
             @{user}, I think you want me to: **{action}**\n\n\
             Is this correct? If so, reply with:\n\
             - \"yes\" or \"do it\" to proceed\n\
             - \"no\" or \"nevermind\" to cancel\n\n\
             I'll wait for your confirmation before making changes."
        )
    }

    pub fn cancelled(user: &str) -> String {
        format!("## ❌ Cancelled\n\n@{user}, action cancelled.")
    }

    pub fn generation_failed(user: &str) -> String {
        format!(
            "## ❌ Failed to Generate Changes\n\n\
             @{user}, I couldn't generate the requested changes. Please try rephrasing your request or make the changes manually."
        )
    }

    pub fn nothing_applied(user: &str) -> String {
        format!(
            "## ⚠️ No Changes Applied\n\n\
             @{user}, I couldn't parse the generated changes. The LLM might have misunderstood the request."
        )
    }

    pub fn commit_failed(user: &str) -> String {
        format!(
            "## ❌ Commit Failed\n\n\
             @{user}, I made the changes but couldn't commit them. Please check the action logs."
        )
    }

    pub fn applied(user: &str, action: &str, files: &[String], hash: &str, changes: &ProposedChanges) -> String {
        let mut out = format!(
            "## ✅ Changes Applied\n\n@{user}, I made the requested changes: **{action}**\n\n### Files Modified ({})\n",
            files.len()
        );
        for f in files {
            let name = Path::new(f).file_name().and_then(|n| n.to_str()).unwrap_or(f);
            let _ = writeln!(out, "- `{name}`");
        }
        let _ = write!(
            out,
            "\n### Commit\n[{hash}](../../commit/{hash})\n\n### What Changed\n{}\n\n---\n\n\
             *If these changes aren't what you wanted, you can always revert this commit or ask me to modify them further.*",
            changes.summary.as_deref().unwrap_or("See commit for details")
        );
        out
    }
}

/// Generates, applies, commits and reports one confirmed action.
async fn execute(
    cfg: &BotConfig,
    comment: &CommentContext,
    llm: &LlmClient,
    git: &GitCli,
    action: &str,
    files: &[String],
) -> PrBotResult<AgentOutcome> {
    info!(%action, files = files.len(), "generating code changes");
    let Some(output) = generate_code_changes(llm, &cfg.workdir, action, files).await else {
        cfg.write_response(&responses::generation_failed(&comment.user)).await?;
        return Ok(AgentOutcome::GenerationFailed);
    };

    let proposed = parse_code_changes(&output);
    let written = apply_edits(&cfg.workdir, &proposed.edits, files).await;
    if written.is_empty() {
        warn!(proposed = proposed.edits.len(), "no applicable edits");
        cfg.write_response(&responses::nothing_applied(&comment.user)).await?;
        return Ok(AgentOutcome::NothingApplied);
    }

    let paths: Vec<&str> = written.iter().map(String::as_str).collect();
    match git.commit_and_push(&paths, &commit_message(action), BOT_IDENTITY).await {
        Ok(hash) => {
            cfg.write_response(&responses::applied(&comment.user, action, &written, &hash, &proposed))
                .await?;
            Ok(AgentOutcome::Committed { hash, files: written })
        }
        Err(e) => {
            warn!(error = %e, "commit failed");
            cfg.write_response(&responses::commit_failed(&comment.user)).await?;
            Ok(AgentOutcome::CommitFailed)
        }
    }
}

/// One agent run for the triggering comment.
pub async fn run(cfg: &BotConfig, comment: &CommentContext, llm: &LlmClient, git: &GitCli) -> PrBotResult<AgentOutcome> {
    info!(user = %comment.user, "edit agent invoked");
    if !is_authorized(&comment.user, &comment.pr_author, &comment.assignees) {
        warn!(user = %comment.user, author = %comment.pr_author, "user not authorized");
        cfg.write_response(&responses::unauthorized(&comment.user, &comment.pr_author))
            .await?;
        return Ok(AgentOutcome::Unauthorized);
    }

    let pending_path = cfg.at(&cfg.pending);
    if let Some(pending) = PendingAction::load(&pending_path).await? {
        if pending.requested_by == comment.user {
            match classify_reply(&comment.body) {
                Reply::Cancel => {
                    PendingAction::clear(&pending_path).await?;
                    cfg.write_response(&responses::cancelled(&comment.user)).await?;
                    info!(action = %pending.action, "pending action cancelled");
                    return Ok(AgentOutcome::Cancelled);
                }
                Reply::Confirm => {
                    PendingAction::clear(&pending_path).await?;
                    info!(action = %pending.action, "pending action confirmed");
                    return execute(cfg, comment, llm, git, &pending.action, &pending.files).await;
                }
                Reply::Unrelated => info!("comment does not answer the pending action"),
            }
        }
    }

    let intent = classify_intent(llm, &comment.body).await;
    if intent.category == IntentCategory::QuestionOnly {
        info!("no action requested");
        return Ok(AgentOutcome::NoAction);
    }

    let files = read_pr_files(&cfg.at(&cfg.pr_files)).await?;
    if files.is_empty() {
        info!("no PR files to modify");
        return Ok(AgentOutcome::NoFiles);
    }
    let action = intent.action_or(&comment.body).to_string();

    if intent.category == IntentCategory::PossibleAction {
        PendingAction {
            action: action.clone(),
            files,
            requested_by: comment.user.clone(),
        }
        .save(&pending_path)
        .await?;
        cfg.write_response(&responses::confirmation(&comment.user, &action)).await?;
        return Ok(AgentOutcome::AwaitingConfirmation);
    }

    execute(cfg, comment, llm, git, &action, &files).await
}
