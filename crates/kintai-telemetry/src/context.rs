//! Span helpers for command execution.
//!
//! # Design
//! - Each CLI invocation runs inside one `command` span carrying the command
//!   name and build SHA so every event it emits can be correlated.

use tracing::Span;

use crate::init::build_sha;

/// Owned span describing the command being executed.
#[derive(Debug, Clone)]
pub struct CommandSpan {
    span: Span,
}

impl CommandSpan {
    /// Create the span for `command`.
    #[must_use]
    pub fn new(command: &str) -> Self {
        let span = tracing::info_span!(
            "command",
            command = %command,
            build_sha = %build_sha(),
            identity = tracing::field::Empty,
        );
        Self { span }
    }

    /// Record the resolved identity on the span.
    pub fn record_identity(&self, identity: &str) {
        self.span.record("identity", tracing::field::display(identity));
    }

    /// Borrow the underlying span, e.g. for `Instrument::instrument`.
    #[must_use]
    pub const fn span(&self) -> &Span {
        &self.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_span_accepts_identity() {
        let span = CommandSpan::new("whoami");
        span.record_identity("user-42");
        let _entered = span.span().enter();
    }
}
