//! Error types for session resolution and credential storage.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for credential storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Reasons a session could not be resolved.
///
/// Every variant collapses to the same user-visible result under
/// [`crate::FailurePolicy::FailClosedOnAnyError`]; the kind is kept for logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No credential was present in local storage.
    #[error("no stored credential")]
    MissingCredential,
    /// The identity service rejected the credential or omitted the identity.
    #[error("credential was rejected by the identity service")]
    InvalidOrExpiredCredential {
        /// Provider-supplied detail, when any.
        detail: Option<String>,
    },
    /// The identity service could not be reached or failed server-side.
    #[error("identity service unreachable")]
    IdentityServiceUnreachable {
        /// Transport or status detail.
        detail: String,
    },
    /// The backend authorization lookup failed.
    #[error("authorization lookup failed")]
    AuthorizationLookupFailed {
        /// Transport or status detail.
        detail: String,
    },
    /// The backend returned a record the resolver could not interpret.
    #[error("authorization payload was malformed")]
    MalformedAuthorizationPayload {
        /// Parse detail.
        detail: String,
    },
}

impl SessionError {
    /// Whether the stored credential should be discarded after this failure.
    ///
    /// Only an explicit rejection proves the credential is stale; transport
    /// failures leave it in place so the next activation can try again.
    #[must_use]
    pub const fn discards_credential(&self) -> bool {
        matches!(self, Self::InvalidOrExpiredCredential { .. })
    }

    /// Stable label used in structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidOrExpiredCredential { .. } => "invalid_or_expired_credential",
            Self::IdentityServiceUnreachable { .. } => "identity_service_unreachable",
            Self::AuthorizationLookupFailed { .. } => "authorization_lookup_failed",
            Self::MalformedAuthorizationPayload { .. } => "malformed_authorization_payload",
        }
    }
}

/// Errors raised by credential stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("credential store io failure")]
    Io {
        /// Path of the backing file.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The backing file did not contain a JSON string map.
    #[error("credential store is corrupt")]
    Corrupt {
        /// Path of the backing file.
        path: PathBuf,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// An in-process lock was poisoned by a panicking writer.
    #[error("credential store lock poisoned")]
    Poisoned,
}
