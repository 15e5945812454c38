//! High-level chat client: cache → retry → transport → (optional) JSON repair.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    cache::ResponseCache,
    config::llm_model_config::{LlmConfig, ModelProfile},
    error_handler::{AiLlmError, Provider, ProviderError, ProviderErrorKind, Result},
    json_coerce::coerce_json,
    retry::RetryPolicy,
    services::open_ai_service::OpenAiService,
};

/// One chat message (`system`, `user` or `assistant`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// `response_format` hint sent to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    JsonObject,
}

/// Everything that identifies one chat call.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub response_format: Option<ResponseFormat>,
    /// Per-call timeout; falls back to the client default.
    pub timeout: Option<Duration>,
    pub use_cache: bool,
}

impl ChatRequest {
    /// Request with the usual defaults: temperature 0.3, 2000 tokens, cached.
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: 0.3,
            max_tokens: 2000,
            response_format: None,
            timeout: None,
            use_cache: true,
        }
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.temperature = t;
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = n;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    pub fn json(mut self) -> Self {
        self.response_format = Some(ResponseFormat::JsonObject);
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }
}

/// Explicitly constructed LLM client, passed by reference to every pipeline.
#[derive(Debug)]
pub struct LlmClient {
    cfg: LlmConfig,
    service: Option<OpenAiService>,
    cache: Option<ResponseCache>,
    retry: RetryPolicy,
}

impl LlmClient {
    /// Builds the client. A missing API key is tolerated: the client is
    /// created and every call fails fast with `MissingApiKey`.
    ///
    /// # Errors
    /// Invalid endpoint or an HTTP client that cannot be built.
    pub fn new(cfg: LlmConfig) -> Result<Self> {
        let service = match cfg.api_key {
            Some(_) => Some(OpenAiService::new(&cfg)?),
            None => {
                warn!("no LLM API key configured, LLM calls will be skipped");
                None
            }
        };
        let cache = cfg
            .cache_enabled
            .then(|| ResponseCache::new(cfg.cache_dir.clone()));
        let retry = RetryPolicy::new(cfg.max_retries, cfg.retry_base);

        Ok(Self {
            cfg,
            service,
            cache,
            retry,
        })
    }

    /// `true` when an API key is present.
    pub fn is_configured(&self) -> bool {
        self.service.is_some()
    }

    pub fn model(&self, profile: ModelProfile) -> &str {
        self.cfg.model(profile)
    }

    /// Shorthand for a `system` + `user` request on the given profile.
    pub fn request(&self, profile: ModelProfile, system: &str, user: &str) -> ChatRequest {
        ChatRequest::new(
            self.model(profile),
            vec![ChatMessage::system(system), ChatMessage::user(user)],
        )
    }

    /// Runs a chat completion with cache lookup and retry/backoff.
    ///
    /// # Errors
    /// `MissingApiKey` when unconfigured; otherwise the last transport or
    /// provider error after retries are exhausted.
    pub async fn call_chat(&self, req: &ChatRequest) -> Result<String> {
        let service = self.service.as_ref().ok_or_else(|| {
            AiLlmError::from(ProviderError::new(
                Provider::from(self.cfg.provider),
                ProviderErrorKind::MissingApiKey,
            ))
        })?;

        let cache = self.cache.as_ref().filter(|_| req.use_cache);
        if let Some(cache) = cache {
            if let Some(hit) = cache.get(req).await {
                info!(model = %req.model, key = %ResponseCache::key(req), "using cached LLM response");
                return Ok(hit);
            }
        }

        let mut content = self.retry.run(|_| service.complete(req)).await?;

        if req.response_format.is_some() {
            content = coerce_json(&content).text;
        }

        if let Some(cache) = cache {
            cache.put(req, &content).await;
        }
        debug!(model = %req.model, chars = content.len(), "LLM call finished");
        Ok(content)
    }

    /// Same as [`Self::call_chat`] with `response_format = json_object`; the
    /// returned text has been through [`coerce_json`] and may still be invalid.
    pub async fn call_chat_json(&self, req: &ChatRequest) -> Result<String> {
        let req = req.clone().json();
        self.call_chat(&req).await
    }

    /// Removes cached responses (all, or those whose name contains `pattern`).
    pub async fn clear_cache(&self, pattern: Option<&str>) -> usize {
        match &self.cache {
            Some(c) => c.clear(pattern).await,
            None => 0,
        }
    }
}
