//! Validation helpers for resolved configuration.

use url::Url;

use crate::defaults::MAX_HTTP_TIMEOUT_SECS;
use crate::error::{ConfigError, ConfigResult};
use crate::model::ClientConfig;

/// Accepted values for `logging.format`.
pub const LOG_FORMATS: [&str; 2] = ["json", "pretty"];

/// Check every field of a resolved configuration.
///
/// # Errors
///
/// Returns the first [`ConfigError::InvalidField`] encountered.
pub fn validate(config: &ClientConfig) -> ConfigResult<()> {
    validate_http_url(&config.identity.endpoint, "identity", "endpoint")?;
    validate_http_url(&config.backend.api_url, "backend", "api_url")?;
    validate_non_empty(&config.identity.client_id, "identity", "client_id")?;
    validate_non_empty(&config.session.credential_key, "session", "credential_key")?;
    validate_non_empty(
        &config.session.privilege_field,
        "session",
        "privilege_field",
    )?;
    validate_login_route(&config.session.login_route)?;
    validate_timeout(config.http.timeout_secs)?;
    validate_non_empty(&config.logging.level, "logging", "level")?;
    if let Some(format) = config.logging.format.as_deref() {
        validate_log_format(format)?;
    }
    if config.session.storage_path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            section: "session",
            field: "storage_path",
            value: None,
            reason: "must not be empty",
        });
    }
    Ok(())
}

#[allow(clippy::redundant_pub_crate)]
pub(crate) fn validate_http_url(
    url: &Url,
    section: &'static str,
    field: &'static str,
) -> ConfigResult<()> {
    if matches!(url.scheme(), "http" | "https") && url.has_host() {
        Ok(())
    } else {
        Err(ConfigError::InvalidField {
            section,
            field,
            value: Some(url.to_string()),
            reason: "must be an http(s) URL with a host",
        })
    }
}

fn validate_non_empty(value: &str, section: &'static str, field: &'static str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        Err(ConfigError::InvalidField {
            section,
            field,
            value: None,
            reason: "must not be empty",
        })
    } else {
        Ok(())
    }
}

fn validate_login_route(route: &str) -> ConfigResult<()> {
    if route.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::InvalidField {
            section: "session",
            field: "login_route",
            value: Some(route.to_string()),
            reason: "must start with '/'",
        })
    }
}

#[allow(clippy::redundant_pub_crate)]
pub(crate) fn validate_timeout(timeout_secs: u64) -> ConfigResult<()> {
    if (1..=MAX_HTTP_TIMEOUT_SECS).contains(&timeout_secs) {
        Ok(())
    } else {
        Err(ConfigError::InvalidField {
            section: "http",
            field: "timeout_secs",
            value: Some(timeout_secs.to_string()),
            reason: "must be between 1 and 300",
        })
    }
}

#[allow(clippy::redundant_pub_crate)]
pub(crate) fn validate_log_format(format: &str) -> ConfigResult<()> {
    if LOG_FORMATS.contains(&format) {
        Ok(())
    } else {
        Err(ConfigError::InvalidField {
            section: "logging",
            field: "format",
            value: Some(format.to_string()),
            reason: "must be 'json' or 'pretty'",
        })
    }
}
