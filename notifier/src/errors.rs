use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use thiserror::Error;

use crate::channels::Channel;

pub type NotifierResult<T> = Result<T, NotifierError>;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("{channel} rejected the message: {status} {body}")]
    Status {
        channel: Channel,
        status: StatusCode,
        body: String,
    },

    #[error("{channel} request failed: {source}")]
    Transport {
        channel: Channel,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Client(#[from] reqwest::Error),

    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl NotifierError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        NotifierError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
