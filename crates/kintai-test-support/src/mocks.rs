//! Scripted stand-ins for the identity service and backend directory.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use kintai_session::{Credential, Identity, IdentityProvider, ProfileDirectory, SessionError};
use serde_json::Value;

/// Identity provider answering from a token → result table.
///
/// Unknown tokens are rejected as invalid, mirroring the real service.
#[derive(Debug, Default)]
pub struct ScriptedIdentityProvider {
    responses: Mutex<HashMap<String, Result<Identity, SessionError>>>,
    calls: AtomicUsize,
}

impl ScriptedIdentityProvider {
    /// Create a provider with no known tokens.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as belonging to `identity`.
    #[must_use]
    pub fn accepting(self, token: &str, identity: &str) -> Self {
        self.script(token, Ok(Identity::new(identity)))
    }

    /// Answer `token` with a specific failure.
    #[must_use]
    pub fn failing(self, token: &str, error: SessionError) -> Self {
        self.script(token, Err(error))
    }

    fn script(self, token: &str, result: Result<Identity, SessionError>) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(token.to_string(), result);
        }
        self
    }

    /// Number of exchanges performed so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for ScriptedIdentityProvider {
    async fn exchange(&self, credential: &Credential) -> Result<Identity, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let responses = self
            .responses
            .lock()
            .map_err(|_| SessionError::IdentityServiceUnreachable {
                detail: "scripted provider lock poisoned".to_string(),
            })?;
        responses
            .get(credential.expose())
            .cloned()
            .unwrap_or_else(|| Err(SessionError::InvalidOrExpiredCredential { detail: None }))
    }
}

/// Profile directory answering from an identity → record table.
///
/// Unknown identities fail the lookup, as a 404 from the backend would.
#[derive(Debug, Default)]
pub struct ScriptedProfileDirectory {
    records: Mutex<HashMap<String, Result<Value, SessionError>>>,
    calls: AtomicUsize,
}

impl ScriptedProfileDirectory {
    /// Create a directory with no records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `record` for `identity`.
    #[must_use]
    pub fn with_record(self, identity: &str, record: Value) -> Self {
        self.script(identity, Ok(record))
    }

    /// Fail lookups for `identity` with `error`.
    #[must_use]
    pub fn failing(self, identity: &str, error: SessionError) -> Self {
        self.script(identity, Err(error))
    }

    fn script(self, identity: &str, result: Result<Value, SessionError>) -> Self {
        if let Ok(mut records) = self.records.lock() {
            records.insert(identity.to_string(), result);
        }
        self
    }

    /// Number of lookups performed so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileDirectory for ScriptedProfileDirectory {
    async fn authorization_record(&self, identity: &Identity) -> Result<Value, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let records = self
            .records
            .lock()
            .map_err(|_| SessionError::AuthorizationLookupFailed {
                detail: "scripted directory lock poisoned".to_string(),
            })?;
        records.get(identity.as_str()).cloned().unwrap_or_else(|| {
            Err(SessionError::AuthorizationLookupFailed {
                detail: format!("no profile for {identity}"),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn unknown_tokens_are_rejected() {
        let provider = ScriptedIdentityProvider::new().accepting("tok-A", "user-42");
        let known = Credential::new("tok-A").expect("credential");
        let unknown = Credential::new("tok-Z").expect("credential");
        assert_eq!(
            provider.exchange(&known).await,
            Ok(Identity::new("user-42"))
        );
        assert!(matches!(
            provider.exchange(&unknown).await,
            Err(SessionError::InvalidOrExpiredCredential { .. })
        ));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn unknown_identities_fail_lookup() {
        let directory =
            ScriptedProfileDirectory::new().with_record("user-7", json!({"privileged": true}));
        assert!(
            directory
                .authorization_record(&Identity::new("user-7"))
                .await
                .is_ok()
        );
        assert!(
            directory
                .authorization_record(&Identity::new("user-8"))
                .await
                .is_err()
        );
        assert_eq!(directory.calls(), 2);
    }
}
