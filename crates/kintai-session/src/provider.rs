//! External collaborators consulted during resolution.

use async_trait::async_trait;
use serde_json::Value;

use crate::credential::{Credential, Identity};
use crate::error::SessionError;

/// Exchanges a credential for the caller's identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Perform a single exchange; implementations must not retry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidOrExpiredCredential`] when the service
    /// rejects the credential or its response lacks an identity, and
    /// [`SessionError::IdentityServiceUnreachable`] for transport failures.
    async fn exchange(&self, credential: &Credential) -> Result<Identity, SessionError>;
}

/// Fetches the backend authorization record for an identity.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Return the raw record; interpretation is left to the resolver.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AuthorizationLookupFailed`] when the record
    /// cannot be fetched and [`SessionError::MalformedAuthorizationPayload`]
    /// when the body is not JSON.
    async fn authorization_record(&self, identity: &Identity) -> Result<Value, SessionError>;
}
