//! Default LLM config loaded from environment variables.
//!
//! # Environment variables
//!
//! - `GROQ_API_KEY` (or `LLM_API_KEY`) = bearer token; optional, calls are skipped without it
//! - `LLM_PROVIDER`      = `groq` (default) or `openai`
//! - `LLM_ENDPOINT`      = base URL override
//! - `LLM_CACHE_DIR`     = response cache directory (default `.llm-cache`)
//! - `LLM_CACHE_ENABLED` = `true`/`false` (default `true`)
//! - `LLM_MAX_RETRIES`   = attempts for 429/5xx/timeouts (default 3)
//! - `LLM_RETRY_BASE_MS` = backoff base in milliseconds (default 1000)
//! - `LLM_TIMEOUT_SECS`  = default request timeout (default 30)
//! - `LLM_MODEL_FAST` / `LLM_MODEL_SLOW` = model identifiers

use std::path::PathBuf;
use std::time::Duration;

use crate::{
    config::{llm_model_config::LlmConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_bool, env_opt, env_opt_u32, env_opt_u64,
        validate_http_endpoint,
    },
};

pub const DEFAULT_MODEL_FAST: &str = "openai/gpt-oss-20b";
pub const DEFAULT_MODEL_SLOW: &str = "openai/gpt-oss-120b";
pub const DEFAULT_CACHE_DIR: &str = ".llm-cache";

/// Builds an [`LlmConfig`] from the environment.
///
/// A missing API key is not an error here: the client is still constructed
/// and reports `MissingApiKey` per call, so pipelines can log and skip.
///
/// # Errors
///
/// - [`ConfigError::InvalidNumber`] for malformed numeric variables
/// - [`ConfigError::InvalidFormat`] if `LLM_ENDPOINT` is not http(s)
/// - [`ConfigError::EmptyModel`] if a model override is blank
pub fn config_from_env() -> Result<LlmConfig, AiLlmError> {
    let provider = env_opt("LLM_PROVIDER")
        .and_then(|p| LlmProvider::parse(&p))
        .unwrap_or_default();

    let endpoint = env_opt("LLM_ENDPOINT").unwrap_or_else(|| provider.default_endpoint().into());
    validate_http_endpoint("LLM_ENDPOINT", &endpoint)?;

    let api_key = env_opt("GROQ_API_KEY").or_else(|| env_opt("LLM_API_KEY"));

    let model_fast = std::env::var("LLM_MODEL_FAST").unwrap_or_else(|_| DEFAULT_MODEL_FAST.into());
    let model_slow = std::env::var("LLM_MODEL_SLOW").unwrap_or_else(|_| DEFAULT_MODEL_SLOW.into());
    if model_fast.trim().is_empty() || model_slow.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }

    Ok(LlmConfig {
        provider,
        endpoint,
        api_key,
        cache_dir: env_opt("LLM_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
        cache_enabled: env_bool("LLM_CACHE_ENABLED", true),
        max_retries: env_opt_u32("LLM_MAX_RETRIES")?.unwrap_or(3).max(1),
        retry_base: Duration::from_millis(env_opt_u64("LLM_RETRY_BASE_MS")?.unwrap_or(1000)),
        default_timeout: Duration::from_secs(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(30)),
        model_fast,
        model_slow,
    })
}

/// Config pointing at an arbitrary endpoint, handy for tests and local gateways.
pub fn config_for_endpoint(endpoint: impl Into<String>, api_key: Option<String>) -> LlmConfig {
    LlmConfig {
        provider: LlmProvider::OpenAI,
        endpoint: endpoint.into(),
        api_key,
        cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        cache_enabled: false,
        max_retries: 3,
        retry_base: Duration::from_millis(1000),
        default_timeout: Duration::from_secs(30),
        model_fast: DEFAULT_MODEL_FAST.into(),
        model_slow: DEFAULT_MODEL_SLOW.into(),
    }
}
