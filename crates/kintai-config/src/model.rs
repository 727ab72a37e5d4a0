//! Typed configuration models and the on-disk overlay shape.
//!
//! # Design
//! - `ClientConfig` is fully populated; every field has a default.
//! - `ConfigFile` mirrors it with optional fields so a file only names what
//!   it overrides.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

/// Identity service connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityConfig {
    /// User-pool JSON endpoint.
    pub endpoint: Url,
    /// App client identifier.
    pub client_id: String,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendConfig {
    /// REST API root.
    pub api_url: Url,
}

/// Session resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSettings {
    /// Credential store file.
    pub storage_path: PathBuf,
    /// Key the credential is stored under.
    pub credential_key: String,
    /// Route unauthenticated callers are sent to.
    pub login_route: String,
    /// Backend profile field holding the privileged flag.
    pub privilege_field: String,
}

/// Transport settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HttpConfig {
    /// Per-request timeout.
    pub timeout_secs: u64,
}

/// Logging settings handed to the telemetry crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingSettings {
    /// Level filter used when `RUST_LOG` is unset.
    pub level: String,
    /// `json` or `pretty`; `None` picks by build profile.
    pub format: Option<String>,
}

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientConfig {
    /// Identity service settings.
    pub identity: IdentityConfig,
    /// Backend settings.
    pub backend: BackendConfig,
    /// Session settings.
    pub session: SessionSettings,
    /// Transport settings.
    pub http: HttpConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Identity overrides read from a file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityFile {
    /// See [`IdentityConfig::endpoint`].
    pub endpoint: Option<Url>,
    /// See [`IdentityConfig::client_id`].
    pub client_id: Option<String>,
}

/// Backend overrides read from a file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendFile {
    /// See [`BackendConfig::api_url`].
    pub api_url: Option<Url>,
}

/// Session overrides read from a file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionFile {
    /// See [`SessionSettings::storage_path`].
    pub storage_path: Option<PathBuf>,
    /// See [`SessionSettings::credential_key`].
    pub credential_key: Option<String>,
    /// See [`SessionSettings::login_route`].
    pub login_route: Option<String>,
    /// See [`SessionSettings::privilege_field`].
    pub privilege_field: Option<String>,
}

/// Transport overrides read from a file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpFile {
    /// See [`HttpConfig::timeout_secs`].
    pub timeout_secs: Option<u64>,
}

/// Logging overrides read from a file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingFile {
    /// See [`LoggingSettings::level`].
    pub level: Option<String>,
    /// See [`LoggingSettings::format`].
    pub format: Option<String>,
}

/// JSON configuration file; every section and field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Identity overrides.
    pub identity: IdentityFile,
    /// Backend overrides.
    pub backend: BackendFile,
    /// Session overrides.
    pub session: SessionFile,
    /// Transport overrides.
    pub http: HttpFile,
    /// Logging overrides.
    pub logging: LoggingFile,
}

impl ClientConfig {
    /// Overlay the fields a file sets.
    pub fn apply_file(&mut self, file: ConfigFile) {
        let ConfigFile {
            identity,
            backend,
            session,
            http,
            logging,
        } = file;

        if let Some(endpoint) = identity.endpoint {
            self.identity.endpoint = endpoint;
        }
        if let Some(client_id) = identity.client_id {
            self.identity.client_id = client_id;
        }
        if let Some(api_url) = backend.api_url {
            self.backend.api_url = api_url;
        }
        if let Some(path) = session.storage_path {
            self.session.storage_path = path;
        }
        if let Some(key) = session.credential_key {
            self.session.credential_key = key;
        }
        if let Some(route) = session.login_route {
            self.session.login_route = route;
        }
        if let Some(field) = session.privilege_field {
            self.session.privilege_field = field;
        }
        if let Some(timeout) = http.timeout_secs {
            self.http.timeout_secs = timeout;
        }
        if let Some(level) = logging.level {
            self.logging.level = level;
        }
        if logging.format.is_some() {
            self.logging.format = logging.format;
        }
    }
}
