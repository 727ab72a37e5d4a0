//! Cognito user-pool client.
//!
//! # Design
//! - Every operation is a `POST` to the pool endpoint with an
//!   `X-Amz-Target` header naming it and an `x-amz-json-1.1` body.
//! - Typed service errors (`{"__type", "message"}`) surface as
//!   [`ClientError::Rejected`]; other non-success answers as
//!   [`ClientError::Status`].
//! - As an [`IdentityProvider`], a 4xx answer or a body without `Username`
//!   marks the credential invalid; transport failures and 5xx answers mean the
//!   service could not be reached and say nothing about the credential.

use async_trait::async_trait;
use kintai_session::{Credential, Identity, IdentityProvider, SessionError};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::error::{ClientError, ClientResult};

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const HEADER_AMZ_TARGET: &str = "x-amz-target";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

const OP_GET_USER: &str = "GetUser";
const OP_INITIATE_AUTH: &str = "InitiateAuth";
const OP_SIGN_UP: &str = "SignUp";
const OP_CONFIRM_SIGN_UP: &str = "ConfirmSignUp";
const OP_RESEND_CODE: &str = "ResendConfirmationCode";

const USER_PASSWORD_AUTH: &str = "USER_PASSWORD_AUTH";

/// Client for the user-pool JSON API.
#[derive(Debug, Clone)]
pub struct CognitoClient {
    http: Client,
    endpoint: Url,
    client_id: String,
}

/// Result of a successful sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    /// Whether the pool confirmed the user without a code.
    pub user_confirmed: bool,
    /// Pool-assigned subject identifier.
    pub user_sub: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserRequest<'a> {
    access_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserResponse {
    #[serde(default)]
    username: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'static str,
    client_id: &'a str,
    auth_parameters: AuthParameters<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct AuthParameters<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpRequest<'a> {
    client_id: &'a str,
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpResponse {
    #[serde(default)]
    user_confirmed: bool,
    #[serde(default)]
    user_sub: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ConfirmSignUpRequest<'a> {
    client_id: &'a str,
    username: &'a str,
    confirmation_code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ResendCodeRequest<'a> {
    client_id: &'a str,
    username: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResendCodeResponse {
    #[serde(default)]
    code_delivery_details: Option<CodeDeliveryDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CodeDeliveryDetails {
    #[serde(default)]
    destination: Option<String>,
}

#[derive(Deserialize)]
struct ServiceError {
    #[serde(rename = "__type")]
    kind: String,
    #[serde(default, alias = "Message")]
    message: String,
}

impl CognitoClient {
    /// Create a client for the pool at `endpoint` using app client `client_id`.
    #[must_use]
    pub fn new(http: Client, endpoint: Url, client_id: impl Into<String>) -> Self {
        Self {
            http,
            endpoint,
            client_id: client_id.into(),
        }
    }

    /// Configured app client identifier.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Look up the user owning `access_token`; `None` when the answer has no
    /// `Username`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failures and non-success answers.
    #[instrument(name = "cognito.get_user", skip_all)]
    pub async fn get_user(&self, access_token: &str) -> ClientResult<Option<String>> {
        let response: GetUserResponse = self
            .call(OP_GET_USER, &GetUserRequest { access_token })
            .await?;
        Ok(response
            .username
            .filter(|username| !username.trim().is_empty()))
    }

    /// Sign in with `USER_PASSWORD_AUTH` and return the access token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Challenge`] when the pool demands a challenge,
    /// [`ClientError::MissingField`] when no access token is issued, and other
    /// [`ClientError`] variants for transport or service failures.
    #[instrument(name = "cognito.initiate_auth", skip(self, password))]
    pub async fn initiate_auth(&self, username: &str, password: &str) -> ClientResult<String> {
        let request = InitiateAuthRequest {
            auth_flow: USER_PASSWORD_AUTH,
            client_id: &self.client_id,
            auth_parameters: AuthParameters { username, password },
        };
        let response: InitiateAuthResponse = self.call(OP_INITIATE_AUTH, &request).await?;

        if let Some(token) = response
            .authentication_result
            .and_then(|result| result.access_token)
            .filter(|token| !token.trim().is_empty())
        {
            return Ok(token);
        }
        if let Some(name) = response.challenge_name {
            return Err(ClientError::Challenge { name });
        }
        Err(ClientError::MissingField {
            operation: OP_INITIATE_AUTH.to_string(),
            field: "AuthenticationResult.AccessToken",
        })
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingField`] when the pool neither confirms
    /// the user nor returns a subject, and other [`ClientError`] variants for
    /// transport or service failures.
    #[instrument(name = "cognito.sign_up", skip(self, password))]
    pub async fn sign_up(&self, username: &str, password: &str) -> ClientResult<SignUpOutcome> {
        let request = SignUpRequest {
            client_id: &self.client_id,
            username,
            password,
        };
        let response: SignUpResponse = self.call(OP_SIGN_UP, &request).await?;

        if response.user_confirmed || response.user_sub.is_some() {
            Ok(SignUpOutcome {
                user_confirmed: response.user_confirmed,
                user_sub: response.user_sub,
            })
        } else {
            Err(ClientError::MissingField {
                operation: OP_SIGN_UP.to_string(),
                field: "UserSub",
            })
        }
    }

    /// Confirm a registration with the emailed code.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failures and non-success answers.
    #[instrument(name = "cognito.confirm_sign_up", skip(self, code))]
    pub async fn confirm_sign_up(&self, username: &str, code: &str) -> ClientResult<()> {
        let request = ConfirmSignUpRequest {
            client_id: &self.client_id,
            username,
            confirmation_code: code,
        };
        self.call::<_, serde_json::Value>(OP_CONFIRM_SIGN_UP, &request)
            .await
            .map(|_| ())
    }

    /// Send a new confirmation code; returns the masked destination when the
    /// pool reports one.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failures and non-success answers.
    #[instrument(name = "cognito.resend_confirmation_code", skip(self))]
    pub async fn resend_confirmation_code(&self, username: &str) -> ClientResult<Option<String>> {
        let request = ResendCodeRequest {
            client_id: &self.client_id,
            username,
        };
        let response: ResendCodeResponse = self.call(OP_RESEND_CODE, &request).await?;
        Ok(response
            .code_delivery_details
            .and_then(|details| details.destination))
    }

    async fn call<B, R>(&self, operation: &'static str, body: &B) -> ClientResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).map_err(|source| ClientError::Encode {
            operation: operation.to_string(),
            source,
        })?;

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, AMZ_JSON)
            .header(HEADER_AMZ_TARGET, format!("{TARGET_PREFIX}.{operation}"))
            .body(payload)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                operation: operation.to_string(),
                source,
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport {
                operation: operation.to_string(),
                source,
            })?;
        debug!(operation, status = status.as_u16(), "identity service answered");

        if !status.is_success() {
            return Err(classify_failure(operation, status.as_u16(), &bytes));
        }

        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &bytes
        };
        serde_json::from_slice(body).map_err(|source| ClientError::Decode {
            operation: operation.to_string(),
            source,
        })
    }
}

fn classify_failure(operation: &str, status: u16, bytes: &[u8]) -> ClientError {
    match serde_json::from_slice::<ServiceError>(bytes) {
        Ok(error) => ClientError::Rejected {
            kind: short_kind(&error.kind).to_string(),
            message: error.message,
            status,
        },
        Err(_) => ClientError::Status {
            operation: operation.to_string(),
            status,
            body: String::from_utf8_lossy(bytes).trim().to_string(),
        },
    }
}

/// `"com.amazonaws...#NotAuthorizedException"` becomes `NotAuthorizedException`.
fn short_kind(raw: &str) -> &str {
    raw.rsplit_once('#').map_or(raw, |(_, kind)| kind)
}

/// Only an outright refusal of the token discards it; throttling and other
/// 4xx answers leave the credential in place.
fn session_error(error: &ClientError) -> SessionError {
    let rejects_credential = match error {
        ClientError::Rejected { kind, status, .. } => {
            kind == "NotAuthorizedException" || matches!(*status, 400 | 401)
        }
        ClientError::Status { status, .. } => matches!(*status, 400 | 401),
        ClientError::Decode { .. } | ClientError::MissingField { .. } => true,
        _ => false,
    };
    if rejects_credential {
        SessionError::InvalidOrExpiredCredential {
            detail: Some(error.to_string()),
        }
    } else {
        SessionError::IdentityServiceUnreachable {
            detail: error.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    async fn exchange(&self, credential: &Credential) -> Result<Identity, SessionError> {
        match self.get_user(credential.expose()).await {
            Ok(Some(username)) => Ok(Identity::new(username)),
            Ok(None) => Err(SessionError::InvalidOrExpiredCredential {
                detail: Some("GetUser response has no Username".to_string()),
            }),
            Err(error) => Err(session_error(&error)),
        }
    }
}
