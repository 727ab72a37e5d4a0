//! Page activation: resolve the session once and gate the page on it.
//!
//! # Design
//! - Every page command starts here; handlers receive a `SessionContext`
//!   instead of reading the credential themselves.
//! - An unauthenticated outcome is reported as [`CliError::Unauthenticated`]
//!   carrying the login route; a denied gate keeps the context so the caller
//!   can show what was retrieved.

use kintai_session::{AccessGate, AccessState, Requirement, SessionContext};
use tracing::debug;

use crate::client::{AppContext, CliError, CliResult};

/// Result of activating a page whose caller is signed in.
#[derive(Debug)]
pub(crate) enum PageAccess {
    Granted(SessionContext),
    Denied(SessionContext),
}

/// Resolve the session and settle the page's gate.
pub(crate) async fn activate(ctx: &AppContext, requirement: Requirement) -> CliResult<PageAccess> {
    let mut gate = AccessGate::new(requirement);
    let resolution = ctx.resolver.resolve().await;
    if let Some(failure) = &resolution.failure {
        debug!(kind = failure.kind(), "session resolution collapsed a failure");
    }

    let state = gate.settle(&resolution.outcome);
    let redirect_to = resolution.outcome.redirect_target().map(str::to_string);
    let context = resolution.outcome.into_context();
    if let Some(session) = &context {
        ctx.span.record_identity(session.identity().as_str());
    }
    match (state, context) {
        (AccessState::Granted, Some(session)) => Ok(PageAccess::Granted(session)),
        (AccessState::Denied, Some(session)) => Ok(PageAccess::Denied(session)),
        _ => Err(CliError::Unauthenticated {
            redirect_to: redirect_to
                .unwrap_or_else(|| ctx.resolver.options().login_route.clone()),
        }),
    }
}

/// Activate a page that only needs a signed-in caller.
pub(crate) async fn require_session(ctx: &AppContext) -> CliResult<SessionContext> {
    match activate(ctx, Requirement::Authenticated).await? {
        PageAccess::Granted(session) => Ok(session),
        PageAccess::Denied(_) => Err(CliError::Denied),
    }
}
