use std::path::{Path, PathBuf};

use thiserror::Error;

pub type DocGenResult<T> = Result<T, DocGenError>;

#[derive(Debug, Error)]
pub enum DocGenError {
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl DocGenError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        DocGenError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
