use std::fs;
use std::path::Path;
use std::process::Command;

use ai_llm_service::LlmClient;
use ai_llm_service::config::default_config::config_for_endpoint;
use git_context_engine::GitCli;
use pr_bot::{AgentOutcome, BotConfig, CommentContext, PendingAction, agent, question};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn git(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("git available");
    assert!(out.status.success(), "git {args:?} failed: {}", String::from_utf8_lossy(&out.stderr));
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

/// A checkout of a bare remote with one pushed commit containing `src/a.ts`.
struct Checkout {
    _root: tempfile::TempDir,
    work: std::path::PathBuf,
    remote: std::path::PathBuf,
}

fn checkout() -> Checkout {
    let root = tempfile::tempdir().unwrap();
    let remote = root.path().join("remote.git");
    let work = root.path().join("work");
    fs::create_dir_all(&remote).unwrap();
    fs::create_dir_all(work.join("src")).unwrap();

    git(&remote, &["init", "-q", "--bare"]);
    git(&work, &["init", "-q"]);
    git(&work, &["config", "user.name", "Dev"]);
    git(&work, &["config", "user.email", "dev@example.com"]);
    fs::write(work.join("src/a.ts"), "export const a = 1;\n").unwrap();
    git(&work, &["add", "."]);
    git(&work, &["commit", "-q", "-m", "init"]);
    git(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);
    git(&work, &["push", "-q", "-u", "origin", "HEAD"]);

    fs::write(work.join("pr_files.txt"), "src/a.ts\nREADME.md\n").unwrap();
    Checkout {
        _root: root,
        work,
        remote,
    }
}

fn cfg(work: &Path) -> BotConfig {
    BotConfig {
        workdir: work.to_path_buf(),
        ..BotConfig::default()
    }
}

fn comment(user: &str, body: &str) -> CommentContext {
    CommentContext {
        body: body.into(),
        user: user.into(),
        pr_author: "dev".into(),
        assignees: vec!["reviewer".into()],
        pr_number: Some(7),
    }
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [ { "message": { "role": "assistant", "content": content } } ]
    }))
}

async fn mock(server: &MockServer, marker: &str, content: &str, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains(marker))
        .respond_with(chat_reply(content))
        .expect(calls)
        .mount(server)
        .await;
}

fn response(work: &Path) -> String {
    fs::read_to_string(work.join("bot_response.md")).unwrap()
}

#[tokio::test]
async fn clear_request_is_applied_committed_and_pushed() {
    let co = checkout();
    let server = MockServer::start().await;
    mock(
        &server,
        "PR intent classifier",
        r#"{"category": "CLEAR_ACTION", "action": "add a header comment", "confidence": 0.95}"#,
        1,
    )
    .await;
    mock(
        &server,
        "code editing assistant",
        "FILE: src/a.ts\n```ts\n// header\nexport const a = 1;\n```\n\nFILE: other.ts\n```\nx\n```\n\nCHANGES:\n- Added header",
        1,
    )
    .await;
    let llm = LlmClient::new(config_for_endpoint(server.uri(), Some("k".into()))).unwrap();

    let outcome = agent::run(
        &cfg(&co.work),
        &comment("reviewer", "add a header comment to a.ts"),
        &llm,
        &GitCli::new(&co.work),
    )
    .await
    .unwrap();

    let AgentOutcome::Committed { hash, files } = outcome.clone() else {
        panic!("expected a commit, got {outcome:?}");
    };
    assert_eq!(files, vec!["src/a.ts"]);
    assert_eq!(hash.len(), 7);
    assert_eq!(fs::read_to_string(co.work.join("src/a.ts")).unwrap(), "// header\nexport const a = 1;\n");
    assert!(!co.work.join("other.ts").exists());

    assert_eq!(git(&co.remote, &["log", "-1", "--pretty=%s"]), "bot: add a header comment");
    assert_eq!(git(&co.remote, &["log", "-1", "--pretty=%an"]), "github-actions[bot]");

    let r = response(&co.work);
    assert!(r.starts_with("## ✅ Changes Applied\n\n@reviewer, I made the requested changes: **add a header comment**"));
    assert!(r.contains(&format!("[{hash}](../../commit/{hash})")));
    assert!(r.contains("### What Changed\n- Added header"));
}

#[tokio::test]
async fn ambiguous_request_waits_for_confirmation() {
    let co = checkout();
    let server = MockServer::start().await;
    mock(
        &server,
        "PR intent classifier",
        r#"{"category": "POSSIBLE_ACTION", "action": "add error handling", "confidence": 0.5}"#,
        1,
    )
    .await;
    mock(&server, "code editing assistant", "I am not sure what to change.", 1).await;
    let llm = LlmClient::new(config_for_endpoint(server.uri(), Some("k".into()))).unwrap();
    let cfg = cfg(&co.work);
    let git = GitCli::new(&co.work);
    let pending = co.work.join("pending_action.json");

    let first = agent::run(&cfg, &comment("dev", "this could use error handling"), &llm, &git)
        .await
        .unwrap();
    assert_eq!(first, AgentOutcome::AwaitingConfirmation);
    let saved = PendingAction::load(&pending).await.unwrap().unwrap();
    assert_eq!(saved.action, "add error handling");
    assert_eq!(saved.files, vec!["src/a.ts", "README.md"]);
    assert_eq!(saved.requested_by, "dev");
    assert!(response(&co.work).contains("I think you want me to: **add error handling**"));

    // The confirmation skips classification and runs the parked action.
    let second = agent::run(&cfg, &comment("dev", "Yes, do it"), &llm, &git).await.unwrap();
    assert_eq!(second, AgentOutcome::NothingApplied);
    assert!(!pending.exists());
    assert!(response(&co.work).starts_with("## ⚠️ No Changes Applied"));
}

#[tokio::test]
async fn requester_can_cancel_without_model_calls() {
    let co = checkout();
    let llm = LlmClient::new(config_for_endpoint("http://127.0.0.1:9", None)).unwrap();
    let pending = co.work.join("pending_action.json");
    PendingAction {
        action: "rename things".into(),
        files: vec!["src/a.ts".into()],
        requested_by: "dev".into(),
    }
    .save(&pending)
    .await
    .unwrap();

    let outcome = agent::run(&cfg(&co.work), &comment("dev", "no, nevermind"), &llm, &GitCli::new(&co.work))
        .await
        .unwrap();
    assert_eq!(outcome, AgentOutcome::Cancelled);
    assert!(!pending.exists());
    assert_eq!(response(&co.work), "## ❌ Cancelled\n\n@dev, action cancelled.");
}

#[tokio::test]
async fn outsiders_are_turned_away_and_questions_are_ignored() {
    let co = checkout();
    let llm = LlmClient::new(config_for_endpoint("http://127.0.0.1:9", None)).unwrap();
    let git = GitCli::new(&co.work);

    let outcome = agent::run(&cfg(&co.work), &comment("mallory", "delete everything"), &llm, &git)
        .await
        .unwrap();
    assert_eq!(outcome, AgentOutcome::Unauthorized);
    assert!(response(&co.work).contains("@mallory, only the PR author (@dev) or assignees"));

    // Without a model every comment classifies as a question.
    fs::remove_file(co.work.join("bot_response.md")).unwrap();
    let outcome = agent::run(&cfg(&co.work), &comment("dev", "fix it"), &llm, &git).await.unwrap();
    assert_eq!(outcome, AgentOutcome::NoAction);
    assert!(!co.work.join("bot_response.md").exists());
}

#[tokio::test]
async fn questions_are_answered_from_pr_code() {
    let co = checkout();
    let server = MockServer::start().await;
    mock(&server, "export const a = 1;", "`a` is a constant export.", 1).await;
    let llm = LlmClient::new(config_for_endpoint(server.uri(), Some("k".into()))).unwrap();

    let r = question::run(&cfg(&co.work), &comment("reviewer", "What is a?"), &llm)
        .await
        .unwrap()
        .unwrap();
    assert!(r.starts_with("## 🤖 Bot Response\n\n@reviewer asked:\n> What is a?\n\n`a` is a constant export.\n"));
    assert_eq!(response(&co.work), r);

    assert!(question::run(&cfg(&co.work), &comment("reviewer", "LGTM"), &llm).await.unwrap().is_none());
}
