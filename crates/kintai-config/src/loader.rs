//! Layered configuration loading.
//!
//! # Design
//! - Layers apply in order: built-in defaults, optional JSON file, `KINTAI_*`
//!   environment variables. CLI flags are applied by the caller afterwards.
//! - The environment is captured once into a map so loading is deterministic
//!   and tests can inject variables without touching the process.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::defaults::{
    API_URL, CLIENT_ID, CREDENTIAL_KEY, HTTP_TIMEOUT_SECS, IDENTITY_ENDPOINT, LOG_LEVEL,
    LOGIN_ROUTE, PRIVILEGE_FIELD, STATE_DIR, STORAGE_FILE,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    BackendConfig, ClientConfig, ConfigFile, HttpConfig, IdentityConfig, LoggingSettings,
    SessionSettings,
};
use crate::validate::validate;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "KINTAI_CONFIG";

const ENV_IDENTITY_ENDPOINT: &str = "KINTAI_IDENTITY_ENDPOINT";
const ENV_CLIENT_ID: &str = "KINTAI_CLIENT_ID";
const ENV_API_URL: &str = "KINTAI_API_URL";
const ENV_STORAGE_PATH: &str = "KINTAI_STORAGE_PATH";
const ENV_CREDENTIAL_KEY: &str = "KINTAI_CREDENTIAL_KEY";
const ENV_LOGIN_ROUTE: &str = "KINTAI_LOGIN_ROUTE";
const ENV_PRIVILEGE_FIELD: &str = "KINTAI_PRIVILEGE_FIELD";
const ENV_HTTP_TIMEOUT_SECS: &str = "KINTAI_HTTP_TIMEOUT_SECS";
const ENV_LOG_LEVEL: &str = "KINTAI_LOG_LEVEL";
const ENV_LOG_FORMAT: &str = "KINTAI_LOG_FORMAT";

/// Builds a [`ClientConfig`] from defaults, an optional file and the
/// environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: BTreeMap<String, String>,
}

impl ConfigLoader {
    /// Capture the `KINTAI_*` variables and config-root hints from the
    /// process environment.
    #[must_use]
    pub fn from_process_env() -> Self {
        Self::with_env(std::env::vars().filter(|(name, _)| {
            name.starts_with("KINTAI_") || name == "XDG_CONFIG_HOME" || name == "HOME"
        }))
    }

    /// Use an explicit set of environment variables.
    #[must_use]
    pub fn with_env<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            file: None,
            env: vars
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    /// Read overrides from `path`, taking precedence over `KINTAI_CONFIG`.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Resolve and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, an
    /// environment override is malformed, or validation fails.
    pub fn load(&self) -> ConfigResult<ClientConfig> {
        let mut config = self.defaults()?;

        if let Some(path) = self.file_path() {
            debug!(path = %path.display(), "applying configuration file");
            config.apply_file(read_file(&path)?);
        }

        self.apply_env(&mut config)?;
        validate(&config)?;
        Ok(config)
    }

    fn file_path(&self) -> Option<PathBuf> {
        self.file.clone().or_else(|| {
            self.var(CONFIG_PATH_ENV)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        })
    }

    fn var(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn defaults(&self) -> ConfigResult<ClientConfig> {
        Ok(ClientConfig {
            identity: IdentityConfig {
                endpoint: builtin_url(IDENTITY_ENDPOINT, "identity", "endpoint")?,
                client_id: CLIENT_ID.to_string(),
            },
            backend: BackendConfig {
                api_url: builtin_url(API_URL, "backend", "api_url")?,
            },
            session: SessionSettings {
                storage_path: self.default_storage_path(),
                credential_key: CREDENTIAL_KEY.to_string(),
                login_route: LOGIN_ROUTE.to_string(),
                privilege_field: PRIVILEGE_FIELD.to_string(),
            },
            http: HttpConfig {
                timeout_secs: HTTP_TIMEOUT_SECS,
            },
            logging: LoggingSettings {
                level: LOG_LEVEL.to_string(),
                format: None,
            },
        })
    }

    fn default_storage_path(&self) -> PathBuf {
        let root = self
            .var("XDG_CONFIG_HOME")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                self.var("HOME")
                    .filter(|value| !value.is_empty())
                    .map(|home| Path::new(&home).join(".config"))
            })
            .unwrap_or_else(|| PathBuf::from("."));
        root.join(STATE_DIR).join(STORAGE_FILE)
    }

    fn apply_env(&self, config: &mut ClientConfig) -> ConfigResult<()> {
        if let Some(value) = self.var(ENV_IDENTITY_ENDPOINT) {
            config.identity.endpoint = env_url(ENV_IDENTITY_ENDPOINT, &value)?;
        }
        if let Some(value) = self.var(ENV_CLIENT_ID) {
            config.identity.client_id = value;
        }
        if let Some(value) = self.var(ENV_API_URL) {
            config.backend.api_url = env_url(ENV_API_URL, &value)?;
        }
        if let Some(value) = self.var(ENV_STORAGE_PATH) {
            config.session.storage_path = PathBuf::from(value);
        }
        if let Some(value) = self.var(ENV_CREDENTIAL_KEY) {
            config.session.credential_key = value;
        }
        if let Some(value) = self.var(ENV_LOGIN_ROUTE) {
            config.session.login_route = value;
        }
        if let Some(value) = self.var(ENV_PRIVILEGE_FIELD) {
            config.session.privilege_field = value;
        }
        if let Some(value) = self.var(ENV_HTTP_TIMEOUT_SECS) {
            config.http.timeout_secs =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnv {
                        name: ENV_HTTP_TIMEOUT_SECS,
                        value: value.clone(),
                        reason: "must be an integer number of seconds",
                    })?;
        }
        if let Some(value) = self.var(ENV_LOG_LEVEL) {
            config.logging.level = value;
        }
        if let Some(value) = self.var(ENV_LOG_FORMAT) {
            config.logging.format = Some(value.trim().to_ascii_lowercase());
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> ConfigResult<ConfigFile> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::ParseFile {
        path: path.to_path_buf(),
        source,
    })
}

fn builtin_url(raw: &str, section: &'static str, field: &'static str) -> ConfigResult<Url> {
    Url::parse(raw).map_err(|_| ConfigError::InvalidField {
        section,
        field,
        value: Some(raw.to_string()),
        reason: "built-in default is not a URL",
    })
}

fn env_url(name: &'static str, value: &str) -> ConfigResult<Url> {
    Url::parse(value.trim()).map_err(|_| ConfigError::InvalidEnv {
        name,
        value: value.to_string(),
        reason: "must be an absolute URL",
    })
}
