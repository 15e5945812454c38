use std::path::{Path, PathBuf};

use git_context_engine::GitContextEngineError;
use thiserror::Error;

pub type PrBotResult<T> = Result<T, PrBotError>;

#[derive(Debug, Error)]
pub enum PrBotError {
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Git(#[from] GitContextEngineError),
}

impl PrBotError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        PrBotError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
