use std::path::Path;
use std::process::Command;

use git_context_engine::GitCli;

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .status()
        .expect("git available");
    assert!(status.success(), "git {args:?} failed");
}

fn repo_with_two_commits() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path();
    git(p, &["init", "-q"]);
    git(p, &["config", "user.name", "Test"]);
    git(p, &["config", "user.email", "test@example.com"]);
    std::fs::write(p.join("a.ts"), "export function a(x) {}\n").unwrap();
    git(p, &["add", "."]);
    git(p, &["commit", "-q", "-m", "first"]);
    std::fs::write(p.join("a.ts"), "export function a(x, y) {}\n").unwrap();
    std::fs::write(p.join("b.ts"), "export const b = 1;\n").unwrap();
    git(p, &["add", "."]);
    git(p, &["commit", "-q", "-m", "second\n\nbody line"]);
    dir
}

#[tokio::test]
async fn reads_previous_revision_and_diff() {
    let dir = repo_with_two_commits();
    let cli = GitCli::new(dir.path());

    let old = cli.show_file("HEAD~1", "a.ts").await.unwrap();
    assert_eq!(old.as_deref(), Some("export function a(x) {}\n"));
    assert_eq!(cli.show_file("HEAD~1", "b.ts").await.unwrap(), None);

    let diff = cli.diff("HEAD~1", "HEAD", "a.ts").await.unwrap();
    assert!(diff.contains("+export function a(x, y) {}"));

    assert_eq!(cli.last_commit_message().await.unwrap(), "second\n\nbody line");
    assert_eq!(cli.short_head().await.unwrap().len(), 7);
}

#[tokio::test]
async fn commit_without_remote_fails_on_push() {
    let dir = repo_with_two_commits();
    std::fs::write(dir.path().join("a.ts"), "export function a() {}\n").unwrap();
    let cli = GitCli::new(dir.path());
    let err = cli
        .commit_and_push(&["a.ts"], "bot: simplify", ("bot", "bot@example.com"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("push"));
    assert_eq!(cli.last_commit_message().await.unwrap(), "bot: simplify");
}
