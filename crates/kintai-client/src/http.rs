//! Shared reqwest plumbing.
//!
//! # Design
//! - One `reqwest::Client` per process carries the configured timeout and an
//!   `x-request-id` header so backend logs can be matched to one invocation.
//! - Status and body handling is centralised so both clients report failures
//!   the same way.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};

/// Header carrying the per-invocation request identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Build the shared HTTP client.
///
/// # Errors
///
/// Returns [`ClientError::Build`] when the TLS backend cannot be initialised.
pub fn build_http_client(timeout: Duration) -> ClientResult<Client> {
    let mut default_headers = HeaderMap::new();
    let request_id = HeaderValue::from_str(&Uuid::new_v4().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
    default_headers.insert(HEADER_REQUEST_ID, request_id);

    Client::builder()
        .timeout(timeout)
        .default_headers(default_headers)
        .build()
        .map_err(|source| ClientError::Build { source })
}

/// Read the body of a response, failing on non-success statuses.
pub(crate) async fn read_success(response: Response, operation: &str) -> ClientResult<Vec<u8>> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|source| ClientError::Transport {
            operation: operation.to_string(),
            source,
        })?;

    if status.is_success() {
        Ok(bytes.to_vec())
    } else {
        Err(ClientError::Status {
            operation: operation.to_string(),
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).trim().to_string(),
        })
    }
}

/// Decode a JSON body, treating an empty body or `null` as `None`.
pub(crate) fn decode_optional<T>(bytes: &[u8], operation: &str) -> ClientResult<Option<T>>
where
    T: serde::de::DeserializeOwned,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<Option<T>>(bytes).map_err(|source| ClientError::Decode {
        operation: operation.to_string(),
        source,
    })
}

/// Decode a JSON body that must be present.
pub(crate) fn decode<T>(bytes: &[u8], operation: &str) -> ClientResult<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_slice(bytes).map_err(|source| ClientError::Decode {
        operation: operation.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn client_builds_with_timeout() {
        assert!(build_http_client(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn optional_decoding_treats_blank_and_null_as_absent() {
        assert_eq!(decode_optional::<Value>(b"", "today").ok(), Some(None));
        assert_eq!(decode_optional::<Value>(b"  \n", "today").ok(), Some(None));
        assert_eq!(decode_optional::<Value>(b"null", "today").ok(), Some(None));
        assert!(matches!(
            decode_optional::<Value>(b"{\"id\":1}", "today"),
            Ok(Some(_))
        ));
        assert!(decode_optional::<Value>(b"{", "today").is_err());
    }
}
