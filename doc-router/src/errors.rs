use std::path::{Path, PathBuf};

use thiserror::Error;

pub type DocRouterResult<T> = Result<T, DocRouterError>;

#[derive(Debug, Error)]
pub enum DocRouterError {
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl DocRouterError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        DocRouterError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
