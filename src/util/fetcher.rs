use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("not found: {uri}")]
    NotFound { uri: String },

    #[error("{code} {message}")]
    Status { code: u16, message: String },

    #[error("request to {uri} timed out")]
    Timeout { uri: String },

    #[error("{0}")]
    Transport(String),
}

/// The network seam of the resolution engine: GETs a document and returns its body.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<Bytes, FetchError>;
}
