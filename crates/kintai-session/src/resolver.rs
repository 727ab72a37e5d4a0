//! Session resolution workflow run on every page activation.
//!
//! # Design
//! - Read the credential once, exchange it once, look the profile up once.
//! - Collapse every failure through [`FailurePolicy`] while keeping the
//!   distinct [`SessionError`] on the [`Resolution`] for diagnostics.
//! - Hold no state between calls; two resolutions over unchanged inputs agree.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::credential::Identity;
use crate::error::SessionError;
use crate::profile::{AuthorizationProfile, DEFAULT_PRIVILEGE_FIELD};
use crate::provider::{IdentityProvider, ProfileDirectory};
use crate::store::CredentialSlot;

/// Login entry point unauthenticated callers are sent to.
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// How resolution failures surface to the page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Any failure resolves to the more restrictive outcome; the caller cannot
    /// tell a network failure from an explicit denial.
    #[default]
    FailClosedOnAnyError,
}

/// Where a failure leaves the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureDisposition {
    /// Treat the caller as signed out and send them to login.
    RedirectToLogin,
    /// Keep the identity but withhold privileges.
    DenyAccess,
}

impl FailurePolicy {
    /// Map a failure kind to its disposition.
    #[must_use]
    pub const fn disposition(self, error: &SessionError) -> FailureDisposition {
        match self {
            Self::FailClosedOnAnyError => match error {
                SessionError::MissingCredential
                | SessionError::InvalidOrExpiredCredential { .. }
                | SessionError::IdentityServiceUnreachable { .. } => {
                    FailureDisposition::RedirectToLogin
                }
                SessionError::AuthorizationLookupFailed { .. }
                | SessionError::MalformedAuthorizationPayload { .. } => {
                    FailureDisposition::DenyAccess
                }
            },
        }
    }
}

/// Tunables for a resolver instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Route unauthenticated callers are redirected to.
    pub login_route: String,
    /// Backend field holding the privileged flag.
    pub privilege_field: String,
    /// Failure handling policy.
    pub policy: FailurePolicy,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            privilege_field: DEFAULT_PRIVILEGE_FIELD.to_string(),
            policy: FailurePolicy::default(),
        }
    }
}

/// Explicit session handed to page handlers instead of ambient storage reads.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionContext {
    identity: Identity,
    profile: Option<AuthorizationProfile>,
    privileged: bool,
}

impl SessionContext {
    /// Build a context; privilege is derived from the profile, so a context
    /// without a profile is never privileged.
    #[must_use]
    pub fn new(identity: Identity, profile: Option<AuthorizationProfile>) -> Self {
        let privileged = profile
            .as_ref()
            .is_some_and(AuthorizationProfile::is_privileged);
        Self {
            identity,
            profile,
            privileged,
        }
    }

    /// Resolved caller identity.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Authorization profile, absent when the lookup failed.
    #[must_use]
    pub const fn profile(&self) -> Option<&AuthorizationProfile> {
        self.profile.as_ref()
    }

    /// Whether the caller holds privileged access.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.privileged
    }
}

/// The three terminal results of a resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionOutcome {
    /// No valid session; navigate to `redirect_to`.
    Unauthenticated {
        /// Login route.
        redirect_to: String,
    },
    /// Valid session without the privileged flag.
    AuthenticatedNonPrivileged(SessionContext),
    /// Valid session with the privileged flag.
    AuthenticatedPrivileged(SessionContext),
}

impl SessionOutcome {
    /// Session context for authenticated outcomes.
    #[must_use]
    pub const fn context(&self) -> Option<&SessionContext> {
        match self {
            Self::Unauthenticated { .. } => None,
            Self::AuthenticatedNonPrivileged(ctx) | Self::AuthenticatedPrivileged(ctx) => Some(ctx),
        }
    }

    /// Consume the outcome, yielding the session context when authenticated.
    #[must_use]
    pub fn into_context(self) -> Option<SessionContext> {
        match self {
            Self::Unauthenticated { .. } => None,
            Self::AuthenticatedNonPrivileged(ctx) | Self::AuthenticatedPrivileged(ctx) => Some(ctx),
        }
    }

    /// Redirect target for the unauthenticated outcome.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated { redirect_to } => Some(redirect_to),
            _ => None,
        }
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::AuthenticatedNonPrivileged(_) => "authenticated",
            Self::AuthenticatedPrivileged(_) => "privileged",
        }
    }
}

/// Outcome plus the internal failure that produced it, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// User-visible outcome.
    pub outcome: SessionOutcome,
    /// Failure that was collapsed into the outcome.
    pub failure: Option<SessionError>,
}

/// Resolves the caller's session from stored credential, identity service,
/// and backend profile.
#[derive(Clone)]
pub struct SessionResolver {
    slot: CredentialSlot,
    identity: Arc<dyn IdentityProvider>,
    directory: Arc<dyn ProfileDirectory>,
    options: ResolverOptions,
}

impl SessionResolver {
    /// Wire a resolver from its collaborators.
    #[must_use]
    pub fn new(
        slot: CredentialSlot,
        identity: Arc<dyn IdentityProvider>,
        directory: Arc<dyn ProfileDirectory>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            slot,
            identity,
            directory,
            options,
        }
    }

    /// Options this resolver was built with.
    #[must_use]
    pub const fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Credential slot shared with login and logout flows.
    #[must_use]
    pub const fn slot(&self) -> &CredentialSlot {
        &self.slot
    }

    /// Run one resolution.
    #[instrument(name = "session.resolve", skip(self))]
    pub async fn resolve(&self) -> Resolution {
        let credential = match self.slot.load() {
            Ok(Some(credential)) => credential,
            Ok(None) => return self.fail(SessionError::MissingCredential, None),
            Err(err) => {
                warn!(error = %err, "credential store unreadable; treating as signed out");
                return self.fail(SessionError::MissingCredential, None);
            }
        };

        let identity = match self.identity.exchange(&credential).await {
            Ok(identity) => identity,
            Err(err) => {
                if err.discards_credential() {
                    if let Err(store_err) = self.slot.discard() {
                        warn!(error = %store_err, "failed to discard rejected credential");
                    }
                }
                return self.fail(err, None);
            }
        };

        let profile = self
            .directory
            .authorization_record(&identity)
            .await
            .and_then(|record| {
                AuthorizationProfile::from_record(record, &self.options.privilege_field)
            });

        match profile {
            Ok(profile) => {
                let context = SessionContext::new(identity, Some(profile));
                let outcome = if context.is_privileged() {
                    SessionOutcome::AuthenticatedPrivileged(context)
                } else {
                    SessionOutcome::AuthenticatedNonPrivileged(context)
                };
                info!(
                    outcome = outcome.label(),
                    identity = %outcome.context().map_or("", |ctx| ctx.identity().as_str()),
                    "session resolved"
                );
                Resolution {
                    outcome,
                    failure: None,
                }
            }
            Err(err) => self.fail(err, Some(identity)),
        }
    }

    fn fail(&self, error: SessionError, identity: Option<Identity>) -> Resolution {
        let disposition = self.options.policy.disposition(&error);
        let outcome = match (disposition, identity) {
            (FailureDisposition::DenyAccess, Some(identity)) => {
                SessionOutcome::AuthenticatedNonPrivileged(SessionContext::new(identity, None))
            }
            _ => SessionOutcome::Unauthenticated {
                redirect_to: self.options.login_route.clone(),
            },
        };
        if matches!(error, SessionError::MissingCredential) {
            info!(outcome = outcome.label(), "no stored credential");
        } else {
            warn!(
                outcome = outcome.label(),
                failure = error.kind(),
                error = %error,
                "session resolution failed closed"
            );
        }
        Resolution {
            outcome,
            failure: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::Credential;
    use crate::store::{CREDENTIAL_KEY, CredentialStore, MemoryCredentialStore};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedIdentity(Result<Identity, SessionError>, AtomicUsize);

    #[async_trait]
    impl IdentityProvider for FixedIdentity {
        async fn exchange(&self, _credential: &Credential) -> Result<Identity, SessionError> {
            self.1.fetch_add(1, Ordering::SeqCst);
            self.0.clone()
        }
    }

    struct FixedDirectory(Result<Value, SessionError>);

    #[async_trait]
    impl ProfileDirectory for FixedDirectory {
        async fn authorization_record(&self, _identity: &Identity) -> Result<Value, SessionError> {
            self.0.clone()
        }
    }

    fn resolver(
        store: Arc<MemoryCredentialStore>,
        identity: Arc<FixedIdentity>,
        record: Result<Value, SessionError>,
    ) -> SessionResolver {
        SessionResolver::new(
            CredentialSlot::with_default_key(store),
            identity,
            Arc::new(FixedDirectory(record)),
            ResolverOptions::default(),
        )
    }

    #[test]
    fn policy_dispositions() {
        let policy = FailurePolicy::FailClosedOnAnyError;
        assert_eq!(
            policy.disposition(&SessionError::MissingCredential),
            FailureDisposition::RedirectToLogin
        );
        assert_eq!(
            policy.disposition(&SessionError::AuthorizationLookupFailed {
                detail: "404".into()
            }),
            FailureDisposition::DenyAccess
        );
    }

    #[test]
    fn context_without_profile_is_never_privileged() {
        let ctx = SessionContext::new(Identity::new("user-1"), None);
        assert!(!ctx.is_privileged());
        let profile = AuthorizationProfile::from_record(json!({"admin": true}), "admin")
            .expect("object record");
        let ctx = SessionContext::new(Identity::new("user-1"), Some(profile));
        assert!(ctx.is_privileged());
    }

    #[tokio::test]
    async fn lookup_failure_keeps_identity_without_privilege() {
        let store = Arc::new(MemoryCredentialStore::with_entry(CREDENTIAL_KEY, "tok-A"));
        let identity = Arc::new(FixedIdentity(
            Ok(Identity::new("user-42")),
            AtomicUsize::new(0),
        ));
        let resolver = resolver(
            store.clone(),
            identity,
            Err(SessionError::AuthorizationLookupFailed {
                detail: "status 500".into(),
            }),
        );
        let resolution = resolver.resolve().await;
        let ctx = resolution.outcome.context().expect("authenticated");
        assert_eq!(ctx.identity().as_str(), "user-42");
        assert!(ctx.profile().is_none());
        assert!(matches!(
            resolution.outcome,
            SessionOutcome::AuthenticatedNonPrivileged(_)
        ));
        assert_eq!(
            store.get(CREDENTIAL_KEY).expect("store").as_deref(),
            Some("tok-A")
        );
    }

    #[tokio::test]
    async fn unreachable_identity_service_keeps_credential() {
        let store = Arc::new(MemoryCredentialStore::with_entry(CREDENTIAL_KEY, "tok-A"));
        let identity = Arc::new(FixedIdentity(
            Err(SessionError::IdentityServiceUnreachable {
                detail: "connection refused".into(),
            }),
            AtomicUsize::new(0),
        ));
        let resolver = resolver(store.clone(), identity, Ok(json!({})));
        let resolution = resolver.resolve().await;
        assert_eq!(resolution.outcome.redirect_target(), Some(DEFAULT_LOGIN_ROUTE));
        assert_eq!(
            store.get(CREDENTIAL_KEY).expect("store").as_deref(),
            Some("tok-A")
        );
    }
}
