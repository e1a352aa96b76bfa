//! Error type shared across the synchronization layer.

use thiserror::Error;

/// Everything that can go wrong between the push channel and a view cache.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The push channel could not be opened or died mid-session.
    #[error("push channel transport error: {0}")]
    Transport(String),

    /// An inbound frame was not a valid push message.
    #[error("failed to decode push message: {0}")]
    Decode(#[from] serde_json::Error),

    /// A decoded message carried a payload its consumer could not use.
    #[error("invalid event payload: {0}")]
    Payload(String),

    /// A refetch against the REST boundary failed.
    #[error("refetch failed: {0}")]
    Refetch(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Refetch(err.to_string())
    }
}
