//! Failure taxonomy of the backend adapter.
//!
//! Every variant names the action or endpoint it came from, so a caller can
//! both pattern-match on the kind of failure and report where it happened.

use thiserror::Error;

use crate::retrieve::ky_http::TransportFailure;

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Error)]
pub enum BackendError {
    /// No response was obtained: connection refused, DNS, TLS, timeout.
    #[error("Network error for {target}: {message}")]
    Network { target: String, message: String },

    /// A response arrived with a status outside 2xx.
    #[error("HTTP error! status: {status} ({target})")]
    Transport { target: String, status: u16 },

    /// A successful response whose body is not JSON.
    #[error("Failed to parse response from {target}: {source}")]
    Decode {
        target: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request could not be formed, so nothing was sent.
    #[error("Invalid request for {target}: {message}")]
    InvalidRequest { target: String, message: String },
}

impl BackendError {
    pub(crate) fn from_failure(target: &str, failure: TransportFailure) -> Self {
        match failure {
            TransportFailure::Connect(message) => BackendError::Network {
                target: target.to_string(),
                message,
            },
            TransportFailure::Build(message) => BackendError::InvalidRequest {
                target: target.to_string(),
                message,
            },
        }
    }

    /// The action name or endpoint path the failing call addressed.
    pub fn target(&self) -> &str {
        match self {
            BackendError::Network { target, .. }
            | BackendError::Transport { target, .. }
            | BackendError::Decode { target, .. }
            | BackendError::InvalidRequest { target, .. } => target,
        }
    }

    /// The HTTP status for [`BackendError::Transport`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, BackendError::Network { .. })
    }
}
