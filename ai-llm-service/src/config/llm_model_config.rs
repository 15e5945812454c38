use std::path::PathBuf;
use std::time::Duration;

use crate::config::llm_provider::LlmProvider;

/// Model tier requested by a pipeline.
///
/// - **Fast**: cheaper model for documentation drafts and answers.
/// - **Slow**: larger model for routing decisions, merges and code edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProfile {
    Fast,
    Slow,
}

/// Client-level configuration shared by every chat call.
///
/// Per-call knobs (temperature, max tokens, timeout) live on
/// [`crate::ChatRequest`]; this struct only carries what is fixed for the
/// lifetime of a process.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Backend flavor, used for error attribution and the default endpoint.
    pub provider: LlmProvider,

    /// Base URL without the `/v1/chat/completions` suffix.
    pub endpoint: String,

    /// Bearer token. `None` means every call is skipped with `MissingApiKey`.
    pub api_key: Option<String>,

    /// Directory holding cached responses (`<hash>.txt`).
    pub cache_dir: PathBuf,

    /// Master switch for the response cache.
    pub cache_enabled: bool,

    /// Total number of attempts for transient failures.
    pub max_retries: u32,

    /// Base delay; attempt `n` waits `retry_base * 2^n`.
    pub retry_base: Duration,

    /// Request timeout used when a call does not specify one.
    pub default_timeout: Duration,

    /// Model behind [`ModelProfile::Fast`].
    pub model_fast: String,

    /// Model behind [`ModelProfile::Slow`].
    pub model_slow: String,
}

impl LlmConfig {
    /// Resolves a profile to its model identifier.
    pub fn model(&self, profile: ModelProfile) -> &str {
        match profile {
            ModelProfile::Fast => &self.model_fast,
            ModelProfile::Slow => &self.model_slow,
        }
    }
}
