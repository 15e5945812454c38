use std::time::Duration;

use ai_llm_service::config::default_config::config_for_endpoint;
use ai_llm_service::error_handler::{AiLlmError, ProviderError, ProviderErrorKind};
use ai_llm_service::{ChatMessage, ChatRequest, LlmClient, LlmConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({ "choices": [ { "message": { "role": "assistant", "content": content } } ] })
}

fn cfg(server: &MockServer) -> LlmConfig {
    let mut cfg = config_for_endpoint(server.uri(), Some("test-key".into()));
    cfg.retry_base = Duration::from_millis(5);
    cfg
}

fn req() -> ChatRequest {
    ChatRequest::new(
        "openai/gpt-oss-20b",
        vec![ChatMessage::system("sys"), ChatMessage::user("hello")],
    )
}

#[tokio::test]
async fn returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "openai/gpt-oss-20b", "max_tokens": 2000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("  hi there \n")))
        .expect(1)
        .mount(&server)
        .await;

    let client = LlmClient::new(cfg(&server)).unwrap();
    assert_eq!(client.call_chat(&req()).await.unwrap(), "hi there");
}

#[tokio::test]
async fn retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = LlmClient::new(cfg(&server)).unwrap();
    assert_eq!(client.call_chat(&req()).await.unwrap(), "ok");
}

#[tokio::test]
async fn gives_up_after_three_rate_limited_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let client = LlmClient::new(cfg(&server)).unwrap();
    let err = client.call_chat(&req()).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(429));
}

#[tokio::test]
async fn client_errors_fail_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let client = LlmClient::new(cfg(&server)).unwrap();
    assert!(client.call_chat(&req()).await.is_err());
}

#[tokio::test]
async fn missing_key_skips_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("x")))
        .expect(0)
        .mount(&server)
        .await;

    let mut c = cfg(&server);
    c.api_key = None;
    let client = LlmClient::new(c).unwrap();
    assert!(!client.is_configured());
    let err = client.call_chat(&req()).await.unwrap_err();
    assert!(matches!(
        err,
        AiLlmError::Provider(ProviderError {
            kind: ProviderErrorKind::MissingApiKey,
            ..
        })
    ));
}

#[tokio::test]
async fn cache_hit_short_circuits_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("cached answer")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut c = cfg(&server);
    c.cache_enabled = true;
    c.cache_dir = dir.path().to_path_buf();

    let first = LlmClient::new(c.clone()).unwrap();
    assert_eq!(first.call_chat(&req()).await.unwrap(), "cached answer");

    // A fresh client (new process) reads the same directory.
    let second = LlmClient::new(c).unwrap();
    assert_eq!(second.call_chat(&req()).await.unwrap(), "cached answer");
    assert_eq!(second.clear_cache(None).await, 1);
}

#[tokio::test]
async fn json_calls_send_format_hint_and_repair_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"response_format": {"type": "json_object"}})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("Here you go:\n```json\n{\"page\": \"Auth\",}\n```")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = LlmClient::new(cfg(&server)).unwrap();
    let text = client.call_chat_json(&req()).await.unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v, json!({"page": "Auth"}));
}
