//! Error types for configuration loading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file")]
    ReadFile {
        /// Path that was read.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The configuration file was not valid JSON for the expected shape.
    #[error("failed to parse configuration file")]
    ParseFile {
        /// Path that was parsed.
        path: PathBuf,
        /// Source serde error.
        source: serde_json::Error,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Section that failed validation.
        section: &'static str,
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// An environment override could not be interpreted.
    #[error("invalid environment override")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// One-line description including the offending location.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::ReadFile { path, source } => {
                format!("failed to read {}: {source}", path.display())
            }
            Self::ParseFile { path, source } => {
                format!("failed to parse {}: {source}", path.display())
            }
            Self::InvalidField {
                section,
                field,
                value,
                reason,
            } => value.as_ref().map_or_else(
                || format!("{section}.{field}: {reason}"),
                |value| format!("{section}.{field} = '{value}': {reason}"),
            ),
            Self::InvalidEnv {
                name,
                value,
                reason,
            } => format!("{name}='{value}': {reason}"),
        }
    }
}
