//! Built-in configuration values.
//!
//! # Design
//! - Defaults point at the hosted user pool and a local backend so a fresh
//!   checkout works against a developer stack without a config file.

/// Cognito user-pool endpoint.
pub const IDENTITY_ENDPOINT: &str = "https://cognito-idp.ap-northeast-1.amazonaws.com/";
/// Public app client registered with the user pool.
pub const CLIENT_ID: &str = "4o4aep13lvfknksuasha3h602u";
/// Backend REST API root.
pub const API_URL: &str = "http://localhost:8080";
/// Storage key holding the access token.
pub const CREDENTIAL_KEY: &str = "access_token";
/// Route unauthenticated callers are redirected to.
pub const LOGIN_ROUTE: &str = "/login";
/// Profile field carrying the privileged flag.
pub const PRIVILEGE_FIELD: &str = "admin";
/// HTTP timeout applied to every request.
pub const HTTP_TIMEOUT_SECS: u64 = 10;
/// Upper bound accepted for the HTTP timeout.
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 300;
/// Default log level when neither config nor `RUST_LOG` set one.
pub const LOG_LEVEL: &str = "info";
/// Directory under the user config root holding client state.
pub(crate) const STATE_DIR: &str = "kintai";
/// File name of the credential store.
pub(crate) const STORAGE_FILE: &str = "storage.json";
