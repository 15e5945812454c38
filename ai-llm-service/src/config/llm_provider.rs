use crate::error_handler::Provider;

/// Backend serving the OpenAI-compatible chat-completions API.
///
/// Both variants speak the same wire protocol; they only differ in the
/// default endpoint and in how errors are attributed in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Groq cloud (`https://api.groq.com/openai`).
    #[default]
    Groq,
    /// OpenAI or any self-hosted OpenAI-compatible gateway.
    OpenAI,
}

impl LlmProvider {
    /// Base URL used when `LLM_ENDPOINT` is not set. The chat path
    /// `/v1/chat/completions` is appended by the service.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            LlmProvider::Groq => "https://api.groq.com/openai",
            LlmProvider::OpenAI => "https://api.openai.com",
        }
    }

    /// Parses `LLM_PROVIDER` values; anything unknown is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "groq" => Some(LlmProvider::Groq),
            "openai" | "chatgpt" => Some(LlmProvider::OpenAI),
            _ => None,
        }
    }
}

impl From<LlmProvider> for Provider {
    fn from(p: LlmProvider) -> Self {
        match p {
            LlmProvider::Groq => Provider::Groq,
            LlmProvider::OpenAI => Provider::OpenAI,
        }
    }
}
