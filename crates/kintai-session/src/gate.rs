//! Tri-state access indicator exposed to pages while resolution runs.

use tracing::{debug, warn};

use crate::resolver::SessionOutcome;

/// What a page requires before it renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Requirement {
    /// Any authenticated caller.
    #[default]
    Authenticated,
    /// Only callers whose profile carries the privileged flag.
    Privileged,
}

/// Observable access state for one page activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessState {
    /// Resolution has not settled yet.
    Pending,
    /// No usable credential; the page should redirect to login.
    Unauthenticated,
    /// Authenticated, but the page requirement is not met.
    Denied,
    /// The page may render.
    Granted,
}

impl AccessState {
    /// Whether the state can no longer change during this activation.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// One-shot gate: starts `Pending` and settles exactly once.
#[derive(Debug)]
pub struct AccessGate {
    requirement: Requirement,
    state: AccessState,
}

impl AccessGate {
    /// Open a gate for a page with the given requirement.
    #[must_use]
    pub const fn new(requirement: Requirement) -> Self {
        Self {
            requirement,
            state: AccessState::Pending,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> AccessState {
        self.state
    }

    /// Settle the gate from a resolver outcome and return the resulting state.
    ///
    /// Later calls leave the first terminal state untouched.
    pub fn settle(&mut self, outcome: &SessionOutcome) -> AccessState {
        if self.state.is_terminal() {
            warn!(state = ?self.state, "access gate already settled; ignoring outcome");
            return self.state;
        }
        self.state = match (outcome, self.requirement) {
            (SessionOutcome::Unauthenticated { .. }, _) => AccessState::Unauthenticated,
            (SessionOutcome::AuthenticatedPrivileged(_), _)
            | (SessionOutcome::AuthenticatedNonPrivileged(_), Requirement::Authenticated) => {
                AccessState::Granted
            }
            (SessionOutcome::AuthenticatedNonPrivileged(_), Requirement::Privileged) => {
                AccessState::Denied
            }
        };
        debug!(state = ?self.state, requirement = ?self.requirement, "access gate settled");
        self.state
    }
}
