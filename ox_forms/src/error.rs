use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported document format '{0}' (expected json, yaml, yml or toml)")]
    UnsupportedFormat(String),
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("No renderer found for component '{0}'")]
    MissingRenderer(String),
    #[error("submission failed: {0}")]
    Submission(String),
}
