//! Shared context, error types, and error classification for the CLI.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use kintai_client::{BackendClient, ClientError, CognitoClient, build_http_client};
use kintai_config::ClientConfig;
use kintai_session::{
    CredentialSlot, CredentialStore, FailurePolicy, FileCredentialStore, ResolverOptions,
    SessionResolver,
};
use kintai_telemetry::CommandSpan;
use reqwest::Client;

/// CLI-level error type separating bad input, operational failures, and the
/// two ways a page can refuse to render.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
    Unauthenticated { redirect_to: String },
    Denied,
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
            Self::Unauthenticated { .. } => 4,
            Self::Denied => 5,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
            Self::Unauthenticated { redirect_to } => {
                format!("not signed in (redirect to {redirect_to}); run `kintai login` first")
            }
            Self::Denied => "access denied: this page requires administrator rights".to_string(),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<kintai_api_models::ValidationError> for CliError {
    fn from(error: kintai_api_models::ValidationError) -> Self {
        Self::Validation(error.to_string())
    }
}

/// Map a client error to a CLI error: requests the server judged invalid are
/// validation errors, everything else is an operational failure.
pub(crate) fn classify_client_error(error: ClientError) -> CliError {
    match error {
        ClientError::Rejected { kind, message, .. } => {
            CliError::validation(format!("{kind}: {message}"))
        }
        ClientError::Status { status, body, .. } if (400..500).contains(&status) => {
            if body.is_empty() {
                CliError::validation(format!("request rejected with status {status}"))
            } else {
                CliError::validation(format!("{body} (status {status})"))
            }
        }
        other => CliError::failure(other),
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) resolver: SessionResolver,
    pub(crate) identity: CognitoClient,
    pub(crate) backend: BackendClient,
    pub(crate) span: CommandSpan,
}

impl AppContext {
    /// Wire clients and the resolver from resolved configuration, storing the
    /// credential in the configured file.
    pub(crate) fn from_config(config: &ClientConfig) -> CliResult<Self> {
        let http = build_http_client(Duration::from_secs(config.http.timeout_secs))
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;
        let store: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(&config.session.storage_path));
        Ok(Self::with_store(config, http, store))
    }

    /// Wire the context around an explicit credential store.
    pub(crate) fn with_store(
        config: &ClientConfig,
        http: Client,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let identity = CognitoClient::new(
            http.clone(),
            config.identity.endpoint.clone(),
            config.identity.client_id.clone(),
        );
        let backend = BackendClient::new(http, config.backend.api_url.clone());
        let slot = CredentialSlot::new(store, config.session.credential_key.clone());
        let options = ResolverOptions {
            login_route: config.session.login_route.clone(),
            privilege_field: config.session.privilege_field.clone(),
            policy: FailurePolicy::FailClosedOnAnyError,
        };
        let resolver = SessionResolver::new(
            slot,
            Arc::new(identity.clone()),
            Arc::new(backend.clone()),
            options,
        );
        Self {
            resolver,
            identity,
            backend,
            span: CommandSpan::new("kintai"),
        }
    }

    /// Attach the span of the running command.
    pub(crate) fn with_span(mut self, span: CommandSpan) -> Self {
        self.span = span;
        self
    }

    /// Credential slot shared by login, logout and the resolver.
    pub(crate) const fn slot(&self) -> &CredentialSlot {
        self.resolver.slot()
    }
}

/// Parse a URL flag.
pub(crate) fn parse_url(input: &str) -> Result<url::Url, String> {
    input
        .parse::<url::Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}
