use std::fs;
use std::path::Path;

use ai_llm_service::LlmClient;
use ai_llm_service::config::default_config::config_for_endpoint;
use chrono::{NaiveDate, NaiveDateTime};
use doc_router::{DocMapping, PageAction, PagesConfig, WikiConfig, pages, wiki};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 4, 5).unwrap().and_hms_opt(6, 7, 8).unwrap()
}

fn offline_llm() -> LlmClient {
    LlmClient::new(config_for_endpoint("http://127.0.0.1:9", None)).unwrap()
}

/// `changed_files.txt` plus a generated doc for every listed stem in `docs`.
fn workdir(changed: &str, docs: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path();
    fs::write(p.join("changed_files.txt"), changed).unwrap();
    fs::create_dir_all(p.join("docs")).unwrap();
    for (stem, body) in docs {
        fs::write(p.join("docs").join(format!("{stem}.md")), body).unwrap();
    }
    dir
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [ { "message": { "role": "assistant", "content": content } } ]
    }))
}

fn load(path: &Path) -> DocMapping {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn wiki_routes_with_fallback_names_and_merges_on_rerun() {
    let dir = workdir("src/auth.ts\nsrc/db.ts\n", &[("auth", "## login()\nSigns in.")]);
    let p = dir.path();
    let cfg = WikiConfig {
        workdir: p.to_path_buf(),
        ..WikiConfig::default()
    };
    let llm = offline_llm();

    let outcome = wiki::run(cfg.clone(), &llm, vec![], now()).await.unwrap().unwrap();
    assert_eq!(outcome.updates, vec![("src/auth.ts".to_string(), "Authentication-API".to_string())]);

    let page = fs::read_to_string(p.join("wiki_updates/Authentication-API.md")).unwrap();
    assert_eq!(
        page,
        "# Authentication API\n\n*Last updated: 2025-04-05 06:07:08*\n\n## login()\nSigns in."
    );

    let mapping = load(&p.join(".github/wiki-mapping.json"));
    assert_eq!(mapping.pages_for("src/auth.ts"), vec!["Authentication-API"]);
    assert!(mapping.site_structure.is_none());

    let summary = fs::read_to_string(p.join("wiki_summary.md")).unwrap();
    assert!(summary.starts_with("## 📚 Wiki Organization Summary\n\n**Total Pages:** 1\n"));
    assert!(summary.contains("- `src/auth.ts` → [Authentication-API]"));

    // Second run reuses the mapping and appends, since merging needs the model.
    fs::write(p.join("docs/auth.md"), "## logout()\nSigns out.").unwrap();
    wiki::run(cfg, &llm, vec![], now()).await.unwrap().unwrap();
    let page = fs::read_to_string(p.join("wiki_updates/Authentication-API.md")).unwrap();
    assert!(page.contains("## login()"));
    assert!(page.ends_with("\n\n---\n\n## logout()\nSigns out."));
}

#[tokio::test]
async fn wiki_uses_model_page_name() {
    let dir = workdir("lib/mailer.ts\n", &[("mailer", "# mailer")]);
    let p = dir.path();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Return only the wiki page name"))
        .respond_with(chat_reply("`Email-Service`\nbecause it sends mail"))
        .expect(1)
        .mount(&server)
        .await;
    let llm = LlmClient::new(config_for_endpoint(server.uri(), Some("k".into()))).unwrap();

    let cfg = WikiConfig {
        workdir: p.to_path_buf(),
        ..WikiConfig::default()
    };
    let outcome = wiki::run(cfg, &llm, vec!["Home".into()], now()).await.unwrap().unwrap();
    assert_eq!(outcome.updates[0].1, "Email-Service");
    assert!(p.join("wiki_updates/Email-Service.md").is_file());
}

#[tokio::test]
async fn pages_follow_model_decisions_per_perspective() {
    let dir = workdir("src/users.ts\n", &[("users", "# users doc")]);
    let p = dir.path();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("documentation strategist"))
        .respond_with(chat_reply(
            r#"{"perspectives": [{"type": "feature", "reason": "user facing"}, {"type": "api", "reason": "exports"}]}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("creating **API** documentation"))
        .respond_with(chat_reply(
            r#"{"action": "create", "page_path": "api/users.md", "reasoning": "new topic"}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("creating **FEATURE** documentation"))
        .respond_with(chat_reply(
            r#"{"action": "append", "page_path": "../escape", "reasoning": "related", "section_title": "Usage"}"#,
        ))
        .mount(&server)
        .await;
    let llm = LlmClient::new(config_for_endpoint(server.uri(), Some("k".into()))).unwrap();

    let cfg = PagesConfig {
        workdir: p.to_path_buf(),
        project_name: "demo".into(),
        ..PagesConfig::default()
    };
    let outcome = pages::run(cfg, &llm, now()).await.unwrap().unwrap();

    let placed: Vec<(&str, PageAction)> = outcome.changes.iter().map(|c| (c.page.as_str(), c.action)).collect();
    assert_eq!(
        placed,
        vec![("api/users.md", PageAction::Create), ("features/escape.md", PageAction::Append)]
    );

    let site = p.join("docs-site");
    assert_eq!(
        fs::read_to_string(site.join("api/users.md")).unwrap(),
        "---\ntitle: Users\nlayout: default\n---\n\n# users doc\n"
    );
    assert!(site.join("features/escape.md").is_file());
    assert!(fs::read_to_string(site.join("api/index.md")).unwrap().contains("- **[Users](users.md)**"));
    assert!(fs::read_to_string(site.join("features/index.md")).unwrap().contains("**[Escape](escape.md)**"));
    assert!(fs::read_to_string(site.join("modules/index.md")).unwrap().contains("*No module documentation yet."));
    let home = fs::read_to_string(site.join("index.md")).unwrap();
    assert!(home.contains("documentation website for demo."));
    assert!(home.ends_with("*Last updated: 2025-04-05 06:07:08*\n"));

    let mapping = load(&p.join(".github/pages-mapping.json"));
    assert_eq!(mapping.pages_for("src/users.ts"), vec!["api/users.md", "features/escape.md"]);
    assert_eq!(mapping.page_metadata["features/escape.md"].last_action.as_deref(), Some("append"));
    assert!(mapping.verify_consistency().is_empty());

    let summary = fs::read_to_string(p.join("pages_summary.md")).unwrap();
    assert!(summary.contains("**Changes Made:** 2"));
    assert!(summary.contains("### src/users.ts -> features/escape.md\n- **Action:** APPEND\n"));
}

#[tokio::test]
async fn pages_fall_back_to_api_section_without_model() {
    let dir = workdir("src/auth.ts\n", &[("auth", "auth docs")]);
    let p = dir.path();
    let cfg = PagesConfig {
        workdir: p.to_path_buf(),
        ..PagesConfig::default()
    };

    let outcome = pages::run(cfg, &offline_llm(), now()).await.unwrap().unwrap();
    assert_eq!(outcome.changes.len(), 1);
    assert_eq!(outcome.changes[0].page, "api/authentication.md");
    assert_eq!(outcome.changes[0].reasoning, "Authentication api");
    assert!(p.join("docs-site/api/authentication.md").is_file());
    assert!(!p.join("docs-site/modules/authentication.md").exists());
}

#[tokio::test]
async fn routers_skip_when_nothing_was_generated() {
    let dir = workdir("src/a.ts\n", &[]);
    let p = dir.path();
    let llm = offline_llm();

    let wiki_cfg = WikiConfig {
        workdir: p.to_path_buf(),
        ..WikiConfig::default()
    };
    assert!(wiki::run(wiki_cfg, &llm, vec![], now()).await.unwrap().is_none());

    let pages_cfg = PagesConfig {
        workdir: p.to_path_buf(),
        ..PagesConfig::default()
    };
    assert!(pages::run(pages_cfg, &llm, now()).await.unwrap().is_none());
    assert!(!p.join("pages_summary.md").exists());
}
