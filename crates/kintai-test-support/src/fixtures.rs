//! Canned records and a pre-wired resolver harness.

use std::sync::Arc;

use kintai_session::{
    CREDENTIAL_KEY, CredentialSlot, CredentialStore, MemoryCredentialStore, ResolverOptions,
    SessionResolver,
};
use serde_json::{Value, json};

use crate::mocks::{ScriptedIdentityProvider, ScriptedProfileDirectory};

/// Privilege field used by the scenario records below.
pub const SCENARIO_PRIVILEGE_FIELD: &str = "privileged";

/// Backend record carrying only the privileged flag.
#[must_use]
pub fn privilege_record(privileged: bool) -> Value {
    json!({ SCENARIO_PRIVILEGE_FIELD: privileged })
}

/// Backend profile record shaped like the `/api/user-profile/me` payload.
#[must_use]
pub fn user_profile_record(user_id: &str, admin: bool) -> Value {
    json!({
        "id": 1,
        "userId": user_id,
        "displayName": "Test User",
        "email": "test.user@example.com",
        "department": "Engineering",
        "admin": admin,
    })
}

/// Resolver wired to in-memory collaborators, with handles kept for assertions.
pub struct ResolverHarness {
    /// Backing credential store.
    pub store: Arc<MemoryCredentialStore>,
    /// Scripted identity service.
    pub identity: Arc<ScriptedIdentityProvider>,
    /// Scripted backend directory.
    pub directory: Arc<ScriptedProfileDirectory>,
    /// Resolver under test.
    pub resolver: SessionResolver,
}

impl ResolverHarness {
    /// Wire a harness; `credential` is stored under [`CREDENTIAL_KEY`] when given.
    #[must_use]
    pub fn new(
        credential: Option<&str>,
        identity: ScriptedIdentityProvider,
        directory: ScriptedProfileDirectory,
    ) -> Self {
        let store = Arc::new(
            credential.map_or_else(MemoryCredentialStore::new, |token| {
                MemoryCredentialStore::with_entry(CREDENTIAL_KEY, token)
            }),
        );
        let identity = Arc::new(identity);
        let directory = Arc::new(directory);
        let options = ResolverOptions {
            privilege_field: SCENARIO_PRIVILEGE_FIELD.to_string(),
            ..ResolverOptions::default()
        };
        let resolver = SessionResolver::new(
            CredentialSlot::with_default_key(store.clone()),
            identity.clone(),
            directory.clone(),
            options,
        );
        Self {
            store,
            identity,
            directory,
            resolver,
        }
    }

    /// Current stored credential, if any.
    #[must_use]
    pub fn stored_credential(&self) -> Option<String> {
        self.store.get(CREDENTIAL_KEY).ok().flatten()
    }

    /// Total requests issued to both collaborators.
    #[must_use]
    pub fn network_calls(&self) -> usize {
        self.identity.calls() + self.directory.calls()
    }
}
