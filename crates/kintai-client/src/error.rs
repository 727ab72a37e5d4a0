//! Error types for the HTTP clients.

use thiserror::Error;

/// Primary error type for client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Building the reqwest client failed.
    #[error("failed to build HTTP client")]
    Build {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// A request URL could not be built from the configured base.
    #[error("invalid request URL for {path}")]
    InvalidUrl {
        /// Path joined onto the base URL.
        path: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
    /// The request never produced a response.
    #[error("request to {operation} failed")]
    Transport {
        /// Operation or route being called.
        operation: String,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The server answered with an unexpected status.
    #[error("{operation} returned status {status}")]
    Status {
        /// Operation or route being called.
        operation: String,
        /// HTTP status code.
        status: u16,
        /// Response body, trimmed.
        body: String,
    },
    /// The identity service rejected the request with a typed error.
    #[error("{kind}: {message}")]
    Rejected {
        /// Short exception name, e.g. `NotAuthorizedException`.
        kind: String,
        /// Human-readable message from the service.
        message: String,
        /// HTTP status code.
        status: u16,
    },
    /// A response body did not match the expected shape.
    #[error("failed to decode {operation} response")]
    Decode {
        /// Operation or route being called.
        operation: String,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// Encoding a request body failed.
    #[error("failed to encode {operation} request")]
    Encode {
        /// Operation or route being called.
        operation: String,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// A successful response lacked a required field.
    #[error("{operation} response is missing {field}")]
    MissingField {
        /// Operation being called.
        operation: String,
        /// Field path that was absent.
        field: &'static str,
    },
    /// Sign-in requires a challenge this client does not answer.
    #[error("sign-in requires challenge {name}")]
    Challenge {
        /// Challenge name returned by the service.
        name: String,
    },
}

/// Convenience alias for client results.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// HTTP status carried by the error, when one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server judged the request itself invalid (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|status| (400..500).contains(&status))
    }
}
