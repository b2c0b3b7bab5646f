//! Error types for backend calls.

use reqwest::StatusCode;
use thiserror::Error;

/// Why an outbound call to the mentor backend failed.
///
/// None of these are fatal. The session controller logs them and degrades:
/// chat failures become an error entry in the transcript, snapshot failures
/// keep the last good snapshot.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    /// The request never produced a response: connection refused, reset,
    /// DNS failure or timeout.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: StatusCode },
    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl BackendError {
    pub fn endpoint(&self) -> &str {
        match self {
            BackendError::Transport { endpoint, .. }
            | BackendError::Status { endpoint, .. }
            | BackendError::Decode { endpoint, .. } => endpoint,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::Transport { source, .. } if source.is_timeout())
    }
}
