use thiserror::Error;

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AnalyzerError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        AnalyzerError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
