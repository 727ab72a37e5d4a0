//! Authorization profile interpretation.

use serde_json::{Map, Value};

use crate::error::SessionError;

/// Backend field carrying the privileged flag unless configured otherwise.
pub const DEFAULT_PRIVILEGE_FIELD: &str = "admin";

/// Backend-owned profile record reduced to the one flag the gate reads.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthorizationProfile {
    privileged: bool,
    record: Map<String, Value>,
}

impl AuthorizationProfile {
    /// Interpret a backend record.
    ///
    /// The caller is privileged only when `field` holds the JSON boolean
    /// `true`; strings, numbers, `null`, or a missing field all read as
    /// non-privileged.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MalformedAuthorizationPayload`] when the record
    /// is not a JSON object.
    pub fn from_record(record: Value, field: &str) -> Result<Self, SessionError> {
        let Value::Object(record) = record else {
            return Err(SessionError::MalformedAuthorizationPayload {
                detail: format!("expected an object, found {}", json_kind(&record)),
            });
        };
        let privileged = matches!(record.get(field), Some(Value::Bool(true)));
        Ok(Self { privileged, record })
    }

    /// Whether the profile grants privileged access.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// The full record as returned by the backend.
    #[must_use]
    pub const fn record(&self) -> &Map<String, Value> {
        &self.record
    }

    /// Convenience accessor for string attributes such as `displayName`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.record.get(name).and_then(Value::as_str)
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_boolean_true_is_privileged() {
        let cases = [
            (json!({"admin": true}), true),
            (json!({"admin": false}), false),
            (json!({"admin": "true"}), false),
            (json!({"admin": 1}), false),
            (json!({"admin": null}), false),
            (json!({"displayName": "Aiko"}), false),
        ];
        for (record, expected) in cases {
            let profile = AuthorizationProfile::from_record(record.clone(), DEFAULT_PRIVILEGE_FIELD)
                .expect("object record");
            assert_eq!(profile.is_privileged(), expected, "record {record}");
        }
    }

    #[test]
    fn privilege_field_is_configurable() {
        let profile = AuthorizationProfile::from_record(json!({"privileged": true}), "privileged")
            .expect("object record");
        assert!(profile.is_privileged());
        let profile =
            AuthorizationProfile::from_record(json!({"privileged": true}), DEFAULT_PRIVILEGE_FIELD)
                .expect("object record");
        assert!(!profile.is_privileged());
    }

    #[test]
    fn non_object_records_are_malformed() {
        for record in [json!(null), json!([1, 2]), json!("admin")] {
            let err = AuthorizationProfile::from_record(record, DEFAULT_PRIVILEGE_FIELD)
                .expect_err("non-object");
            assert_eq!(err.kind(), "malformed_authorization_payload");
        }
    }

    #[test]
    fn attributes_are_retained() {
        let profile = AuthorizationProfile::from_record(
            json!({"userId": "user-7", "displayName": "Ren", "admin": true}),
            DEFAULT_PRIVILEGE_FIELD,
        )
        .expect("object record");
        assert_eq!(profile.attribute("displayName"), Some("Ren"));
        assert_eq!(profile.record().len(), 3);
    }
}
