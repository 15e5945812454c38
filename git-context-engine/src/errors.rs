//! Crate-wide error hierarchy for git-context-engine.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type GitContextEngineResult<T> = Result<T, GitContextEngineError>;

/// Root error type for the git-context-engine crate.
#[derive(Debug, Error)]
pub enum GitContextEngineError {
    /// GitHub REST failure.
    #[error(transparent)]
    Provider(#[from] GitContextEngineProviderError),

    /// Local `git` invocation failure.
    #[error(transparent)]
    Git(#[from] GitCommandError),

    /// Configuration problems (missing token, malformed repository slug).
    #[error(transparent)]
    Config(#[from] GitContextEngineConfigError),

    /// Input validation errors (bad paths, unsupported formats, etc.).
    #[error("validation error: {0}")]
    Validation(String),
}

/// Provider-specific error used inside the GitHub client.
#[derive(Debug, Error)]
pub enum GitContextEngineProviderError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// Gateway / server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status (non-2xx) not covered by specific variants.
    #[error("http status error: status {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of provider response.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// A `git` subprocess that could not be spawned or exited non-zero.
#[derive(Debug, Error)]
pub enum GitCommandError {
    #[error("failed to spawn git {args}: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {args} exited with {status}: {stderr}")]
    Failed {
        args: String,
        status: i32,
        stderr: String,
    },
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum GitContextEngineConfigError {
    /// Missing required access token.
    #[error("missing GitHub token")]
    MissingToken,

    /// `GITHUB_REPOSITORY` absent or not `owner/repo`.
    #[error("invalid repository '{0}', expected 'owner/repo'")]
    InvalidRepository(String),
}

// ===== Conversions for `?` ergonomics at the crate root =====

impl From<reqwest::Error> for GitContextEngineError {
    fn from(e: reqwest::Error) -> Self {
        GitContextEngineError::Provider(GitContextEngineProviderError::from(e))
    }
}

// ===== Mapping from reqwest::Error into GitContextEngineProviderError =====

impl From<reqwest::Error> for GitContextEngineProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return GitContextEngineProviderError::Timeout;
        }

        if let Some(status) = e.status() {
            return Self::from_status(status.as_u16());
        }

        GitContextEngineProviderError::Network(e.to_string())
    }
}

impl GitContextEngineProviderError {
    pub fn from_status(code: u16) -> Self {
        match code {
            401 => GitContextEngineProviderError::Unauthorized,
            403 => GitContextEngineProviderError::Forbidden,
            404 => GitContextEngineProviderError::NotFound,
            429 => GitContextEngineProviderError::RateLimited,
            500..=599 => GitContextEngineProviderError::Server(code),
            _ => GitContextEngineProviderError::HttpStatus(code),
        }
    }
}
