use std::error::Error as StdError;

/// Errors raised while talking to the training backend.
///
/// The public client operations never hand these to the caller; they are
/// logged and collapsed into a "no data" result. They surface only from
/// construction and from the lower-level helpers.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Transport error: {0}")]
    Transport(Box<dyn StdError + Send + Sync + 'static>),
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Base URL cannot carry path segments: {0}")]
    InvalidBaseUrl(String),
    #[error("Path segment {0:?} would be collapsed by URL normalization")]
    DotSegment(String),
}

impl ClientError {
    /// Wraps an error coming from a custom [`Transport`](super::Transport).
    pub fn transport<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ClientError::Transport(Box::new(err))
    }
}
