use git_context_engine::{GitHubClient, GitHubConfig};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> GitHubClient {
    GitHubClient::from_config(GitHubConfig {
        base_api: server.uri(),
        token: Some("ghp_test".into()),
        repository: Some("acme/widgets".into()),
    })
    .unwrap()
}

#[tokio::test]
async fn lists_wiki_titles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/wiki/pages"))
        .and(header("authorization", "Bearer ghp_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"title": "Home"}, {"title": "Authentication-API"}
        ])))
        .mount(&server)
        .await;

    let titles = client(&server).list_wiki_pages().await.unwrap();
    assert_eq!(titles, vec!["Home", "Authentication-API"]);
}

#[tokio::test]
async fn missing_wiki_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/wiki/pages"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(client(&server).list_wiki_pages().await.unwrap().is_empty());
}

#[tokio::test]
async fn reads_file_at_ref() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/contents/src/api.ts"))
        .and(query_param("ref", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("export function a() {}"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/contents/src/new.ts"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let c = client(&server);
    assert_eq!(
        c.file_at_ref("src/api.ts", "abc123").await.unwrap().as_deref(),
        Some("export function a() {}")
    );
    assert_eq!(c.file_at_ref("src/new.ts", "abc123").await.unwrap(), None);
    assert!(c.file_at_ref("../etc/passwd", "abc123").await.is_err());
}

#[tokio::test]
async fn posts_comment_and_labels() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/widgets/issues/7/comments"))
        .and(body_json(json!({"body": "hello"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/widgets/issues/7/labels"))
        .and(body_json(json!({"labels": ["breaking-change"]})))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let c = client(&server);
    c.post_issue_comment(7, "hello").await.unwrap();
    assert!(c.add_labels(7, &["breaking-change"]).await.is_err());
}
