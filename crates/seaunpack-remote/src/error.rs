//! Error types for seaunpack-remote.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("file I/O error on '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("remote path not found: {0}")]
    NotFound(String),
}

impl From<url::ParseError> for RemoteError {
    fn from(e: url::ParseError) -> Self {
        RemoteError::InvalidUrl(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RemoteError>;
