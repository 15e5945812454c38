//! Answers questions asked in PR comments, grounded in the PR's code.

use std::fmt::Write as _;
use std::path::Path;

use ai_llm_service::{LlmClient, ModelProfile};
use tracing::{info, warn};

use crate::context::{BotConfig, CommentContext, load_code_files, read_pr_files};
use crate::errors::PrBotResult;

const MAX_FILE_CHARS: usize = 10_000;
const TRUNCATED_LINES: usize = 200;

const SYSTEM_PROMPT: &str =
    "You are a helpful code review assistant. Answer questions about code changes clearly and concisely.";

const QUESTION_MARKERS: &[&str] = &["?", "@bot", "explain", "what", "how", "why", "show me", "tell me"];

pub const RESPONSE_FOOTER: &str = "*I'm an AI assistant analyzing the code changes in this PR. My responses are based on the changed files and may not have full context.*";

/// A comment is a question when it carries a question marker and is not one
/// of the bot's own replies.
pub fn should_respond(comment: &str) -> bool {
    if comment.starts_with("## 🤖") {
        return false;
    }
    let lower = comment.to_lowercase();
    QUESTION_MARKERS.iter().any(|m| lower.contains(m))
}

/// Markdown block per code file. Large files are cut to their first lines.
pub fn build_code_context(files: &[(String, String)]) -> String {
    let mut out = String::from("Code changes in this PR:\n\n");
    for (path, content) in files {
        let p = Path::new(path);
        let name = p.file_name().and_then(|n| n.to_str()).unwrap_or(path);
        let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
        let body = if content.chars().count() > MAX_FILE_CHARS {
            let head: Vec<&str> = content.split('\n').take(TRUNCATED_LINES).collect();
            format!("{}\n... (file truncated)", head.join("\n"))
        } else {
            content.clone()
        };
        let _ = write!(out, "## {name}\n```{ext}\n{body}\n```\n\n");
    }
    out
}

fn answer_prompt(user: &str, question: &str, code_context: &str) -> String {
    format!(
        "You are a helpful code review assistant. A developer asked a question about changes in a pull request.\n\n\
         {code_context}\n\n\
         Question from @{user}:\n{question}\n\n\
         Provide a clear, helpful answer based on the code shown above. If the question asks about something not visible in the code, say so. Be concise but thorough."
    )
}

/// The model's answer, or an inline error line. Never fails.
pub async fn answer_question(llm: &LlmClient, user: &str, question: &str, code_context: &str) -> String {
    if !llm.is_configured() {
        return "❌ Bot configuration error: No API key".into();
    }
    let req = llm
        .request(ModelProfile::Fast, SYSTEM_PROMPT, &answer_prompt(user, question, code_context))
        .temperature(0.3)
        .max_tokens(2000)
        .timeout_secs(30);
    match llm.call_chat(&req).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!(error = %e, "answer generation failed");
            format!("❌ Error generating response: {e}")
        }
    }
}

pub fn render_answer(user: &str, question: &str, answer: &str) -> String {
    format!("## 🤖 Bot Response\n\n@{user} asked:\n> {question}\n\n{answer}\n\n---\n\n{RESPONSE_FOOTER}\n")
}

/// Writes `bot_response.md` for a question. `None` when the comment is not
/// a question or the PR lists no files.
pub async fn run(cfg: &BotConfig, comment: &CommentContext, llm: &LlmClient) -> PrBotResult<Option<String>> {
    if !should_respond(&comment.body) {
        info!("comment is not a question, skipping");
        return Ok(None);
    }
    info!(user = %comment.user, "question received");

    let files = read_pr_files(&cfg.at(&cfg.pr_files)).await?;
    if files.is_empty() {
        info!("no PR files to analyze");
        return Ok(None);
    }
    info!(files = files.len(), "building code context");

    let loaded = load_code_files(&cfg.workdir, &files).await;
    let context = build_code_context(&loaded);
    let answer = answer_question(llm, &comment.user, &comment.body, &context).await;

    let response = render_answer(&comment.user, &comment.body, &answer);
    cfg.write_response(&response).await?;
    info!(chars = answer.len(), "response written");
    Ok(Some(response))
}
