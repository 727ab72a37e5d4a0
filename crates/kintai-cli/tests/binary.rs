use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use httpmock::prelude::*;
use serde_json::{Value, json};

fn kintai(storage: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kintai"))
        .env_clear()
        .env("KINTAI_STORAGE_PATH", storage)
        .env("KINTAI_LOG_LEVEL", "warn")
        .args(args)
        .output()
        .expect("run kintai")
}

#[test]
fn whoami_without_token_exits_with_redirect() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = dir.path().join("storage.json");

    let output = kintai(&storage, &["whoami"]);

    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/login"), "stderr: {stderr}");
}

#[test]
fn logout_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = dir.path().join("storage.json");
    fs::write(&storage, r#"{"access_token": "tok-A", "theme": "dark"}"#).expect("seed store");

    assert_eq!(kintai(&storage, &["logout"]).status.code(), Some(0));
    assert_eq!(kintai(&storage, &["logout"]).status.code(), Some(0));

    let remaining: Value =
        serde_json::from_slice(&fs::read(&storage).expect("store file")).expect("json");
    assert_eq!(remaining, json!({"theme": "dark"}));
}

#[test]
fn logout_clears_an_unreadable_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = dir.path().join("storage.json");
    fs::write(&storage, r#"{"access_token": 5}"#).expect("seed store");

    assert_eq!(kintai(&storage, &["logout"]).status.code(), Some(0));
    assert!(!storage.exists());
}

#[test]
fn invalid_timeout_is_a_usage_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = dir.path().join("storage.json");

    let output = kintai(&storage, &["--timeout", "0", "whoami"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn whoami_prints_resolved_identity_as_json() {
    let identity = MockServer::start();
    let backend = MockServer::start();
    identity.mock(|when, then| {
        when.method(POST)
            .header("x-amz-target", "AWSCognitoIdentityProviderService.GetUser")
            .json_body(json!({"AccessToken": "tok-B"}));
        then.status(200).json_body(json!({"Username": "user-7"}));
    });
    backend.mock(|when, then| {
        when.method(GET)
            .path("/api/user-profile/me")
            .query_param("userId", "user-7");
        then.status(200)
            .json_body(json!({"userId": "user-7", "admin": true}));
    });
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = dir.path().join("storage.json");
    fs::write(&storage, r#"{"access_token": "tok-B"}"#).expect("seed store");

    let output = kintai(
        &storage,
        &[
            "--identity-endpoint",
            &identity.url("/"),
            "--api-url",
            &backend.base_url(),
            "--output",
            "json",
            "whoami",
        ],
    );

    assert_eq!(output.status.code(), Some(0));
    let body: Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(body["identity"], "user-7");
    assert_eq!(body["privileged"], true);
}
