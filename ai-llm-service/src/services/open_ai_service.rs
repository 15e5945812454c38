//! OpenAI-compatible chat-completions transport (Groq, OpenAI, gateways).
//!
//! One non-streaming `POST {endpoint}/v1/chat/completions` per call. Retry,
//! caching and JSON repair are layered on top by [`crate::LlmClient`]; this
//! type performs exactly one attempt and normalizes errors.
//!
//! Constructor validation:
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://

use std::time::Instant;

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    client::{ChatMessage, ChatRequest, ResponseFormat},
    config::llm_model_config::LlmConfig,
    error_handler::{
        AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet,
    },
};

/// Thin client for one chat-completions endpoint.
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    provider: Provider,
    url_chat: String,
    default_timeout: std::time::Duration,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - `MissingApiKey` if `cfg.api_key` is `None`
    /// - `InvalidEndpoint` if `cfg.endpoint` is not http(s)
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: &LlmConfig) -> Result<Self, AiLlmError> {
        let provider = Provider::from(cfg.provider);

        let api_key = cfg
            .api_key
            .clone()
            .ok_or_else(|| ProviderError::new(provider, ProviderErrorKind::MissingApiKey))?;

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                provider,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e| {
                ProviderError::new(
                    provider,
                    ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
                )
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_chat = format!("{}/v1/chat/completions", base);

        info!(
            %provider,
            endpoint = %cfg.endpoint,
            timeout_secs = cfg.default_timeout.as_secs(),
            "chat completions service initialized"
        );

        Ok(Self {
            client,
            provider,
            url_chat,
            default_timeout: cfg.default_timeout,
        })
    }

    /// Performs a single chat completion attempt and returns the trimmed
    /// content of the first choice.
    ///
    /// # Errors
    /// - [`AiLlmError::Timeout`] when the request exceeds its timeout
    /// - `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for other client/network failures
    /// - `Decode` / `EmptyChoices` when the body is not a usable completion
    pub async fn complete(&self, req: &ChatRequest) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let timeout = req.timeout.unwrap_or(self.default_timeout);
        let body = ChatCompletionRequest::from_request(req);

        debug!(
            model = %req.model,
            messages = req.messages.len(),
            json = req.response_format.is_some(),
            timeout_ms = timeout.as_millis() as u64,
            "POST {}", self.url_chat
        );

        let resp = self
            .client
            .post(&self.url_chat)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiLlmError::Timeout(timeout)
                } else {
                    AiLlmError::from(e)
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %req.model,
                latency_ms = started.elapsed().as_millis(),
                "/v1/chat/completions returned non-success status"
            );

            return Err(ProviderError::new(
                self.provider,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url,
                    snippet,
                }),
            )
            .into());
        }

        let out: ChatCompletionResponse = match resp.json().await {
            Ok(v) => v,
            Err(e) if e.is_timeout() => return Err(AiLlmError::Timeout(timeout)),
            Err(e) => {
                error!(
                    error = %e,
                    model = %req.model,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode /v1/chat/completions response"
                );
                return Err(ProviderError::new(
                    self.provider,
                    ProviderErrorKind::Decode(format!(
                        "serde error: {e}; expected `choices[0].message.content`"
                    )),
                )
                .into());
            }
        };

        let content = out
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::new(self.provider, ProviderErrorKind::EmptyChoices))?;

        info!(
            model = %req.model,
            latency_ms = started.elapsed().as_millis(),
            chars = content.len(),
            "chat completion completed"
        );

        Ok(content.trim().to_string())
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<WireResponseFormat>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_request(req: &'a ChatRequest) -> Self {
        Self {
            model: &req.model,
            messages: &req.messages,
            temperature: req.temperature,
            max_tokens: req.max_tokens,
            response_format: req.response_format.map(|f| match f {
                ResponseFormat::JsonObject => WireResponseFormat {
                    kind: "json_object",
                },
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct WireResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}
