//! Backend REST client.
//!
//! # Design
//! - Routes live under `/api/` on the configured base URL; per-user reads
//!   pass the identity as the `userId` query parameter.
//! - As a [`ProfileDirectory`], any failure to obtain a record is an
//!   authorization lookup failure and a body that is not JSON is a malformed
//!   payload; interpreting the record is left to the session crate.

use async_trait::async_trait;
use kintai_api_models::{
    AttendanceRecord, AttendanceUpdateRequest, ExpenseReport, ExpenseReportRequest, Memo,
    MemoRequest, Punch, UserProfile,
};
use kintai_session::{Identity, ProfileDirectory, SessionError};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::http::{decode, decode_optional, read_success};

const MEMOS: &str = "/api/memos";
const ATTENDANCE: &str = "/api/attendance";
const EXPENSE_REPORTS: &str = "/api/expense-reports";
const USER_PROFILE: &str = "/api/user-profile";
const USER_PROFILE_ME: &str = "/api/user-profile/me";

/// Client for the Kintai REST API.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a client rooted at `base_url`.
    #[must_use]
    pub const fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Configured API root.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the raw profile record used for authorization.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failures, non-success statuses
    /// and bodies that are not JSON.
    #[instrument(name = "backend.profile_record", skip(self))]
    pub async fn profile_record(&self, user_id: &str) -> ClientResult<Value> {
        let url = self.url(USER_PROFILE_ME, Some(user_id))?;
        let bytes = self.send(self.http.get(url), USER_PROFILE_ME).await?;
        decode(&bytes, USER_PROFILE_ME)
    }

    /// List all memos.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request or decoding fails.
    pub async fn list_memos(&self) -> ClientResult<Vec<Memo>> {
        self.get_list(MEMOS, None).await
    }

    /// Create a memo.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails.
    pub async fn create_memo(&self, memo: &MemoRequest) -> ClientResult<()> {
        self.write(Method::POST, MEMOS, None, Some(memo)).await
    }

    /// List the caller's attendance records.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request or decoding fails.
    pub async fn list_attendance(&self, user_id: &str) -> ClientResult<Vec<AttendanceRecord>> {
        self.get_list(ATTENDANCE, Some(user_id)).await
    }

    /// Today's record, if the caller has clocked in.
    ///
    /// A `404`, an empty body and `null` all mean no record.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] for other failures.
    #[instrument(name = "backend.today_attendance", skip(self))]
    pub async fn today_attendance(&self, user_id: &str) -> ClientResult<Option<AttendanceRecord>> {
        let path = format!("{ATTENDANCE}/today");
        let url = self.url(&path, Some(user_id))?;
        match self.send(self.http.get(url), &path).await {
            Ok(bytes) => decode_optional(&bytes, &path),
            Err(ClientError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// Record a time-clock punch for the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails.
    #[instrument(name = "backend.punch", skip(self))]
    pub async fn punch(&self, user_id: &str, punch: Punch) -> ClientResult<()> {
        let path = format!("{ATTENDANCE}/{}", punch.path_segment());
        let method = if punch.creates_record() {
            Method::POST
        } else {
            Method::PUT
        };
        self.write::<()>(method, &path, Some(user_id), None).await
    }

    /// Replace the times and status of an attendance record.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails.
    pub async fn update_attendance(
        &self,
        id: i64,
        update: &AttendanceUpdateRequest,
    ) -> ClientResult<()> {
        let path = format!("{ATTENDANCE}/{id}");
        self.write(Method::PUT, &path, None, Some(update)).await
    }

    /// Delete an attendance record.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails.
    pub async fn delete_attendance(&self, id: i64) -> ClientResult<()> {
        let path = format!("{ATTENDANCE}/{id}");
        self.write::<()>(Method::DELETE, &path, None, None).await
    }

    /// List the caller's expense reports.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request or decoding fails.
    pub async fn list_expense_reports(&self, user_id: &str) -> ClientResult<Vec<ExpenseReport>> {
        self.get_list(EXPENSE_REPORTS, Some(user_id)).await
    }

    /// File a new expense report.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails.
    pub async fn create_expense_report(&self, report: &ExpenseReportRequest) -> ClientResult<()> {
        self.write(Method::POST, EXPENSE_REPORTS, None, Some(report))
            .await
    }

    /// Replace an expense report.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails.
    pub async fn update_expense_report(
        &self,
        id: i64,
        report: &ExpenseReportRequest,
    ) -> ClientResult<()> {
        let path = format!("{EXPENSE_REPORTS}/{id}");
        self.write(Method::PUT, &path, None, Some(report)).await
    }

    /// Delete an expense report.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails.
    pub async fn delete_expense_report(&self, id: i64) -> ClientResult<()> {
        let path = format!("{EXPENSE_REPORTS}/{id}");
        self.write::<()>(Method::DELETE, &path, None, None).await
    }

    /// The caller's profile; a blank profile when none has been saved.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] for failures other than "not found".
    #[instrument(name = "backend.user_profile", skip(self))]
    pub async fn user_profile(&self, user_id: &str) -> ClientResult<UserProfile> {
        let url = self.url(USER_PROFILE, Some(user_id))?;
        let found = match self.send(self.http.get(url), USER_PROFILE).await {
            Ok(bytes) => decode_optional::<UserProfile>(&bytes, USER_PROFILE)?,
            Err(ClientError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                None
            }
            Err(error) => return Err(error),
        };
        Ok(found.unwrap_or_else(|| UserProfile::blank(user_id)))
    }

    /// Create or replace the caller's profile.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails.
    pub async fn save_user_profile(&self, profile: &UserProfile) -> ClientResult<()> {
        self.write(Method::POST, USER_PROFILE, None, Some(profile))
            .await
    }

    fn url(&self, path: &str, user_id: Option<&str>) -> ClientResult<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|source| ClientError::InvalidUrl {
                path: path.to_string(),
                source,
            })?;
        if let Some(user_id) = user_id {
            url.query_pairs_mut().append_pair("userId", user_id);
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> ClientResult<Vec<u8>> {
        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                operation: path.to_string(),
                source,
            })?;
        debug!(path, status = response.status().as_u16(), "backend answered");
        read_success(response, path).await
    }

    async fn get_list<T>(&self, path: &str, user_id: Option<&str>) -> ClientResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path, user_id)?;
        let bytes = self.send(self.http.get(url), path).await?;
        Ok(decode_optional::<Vec<T>>(&bytes, path)?.unwrap_or_default())
    }

    async fn write<B>(
        &self,
        method: Method,
        path: &str,
        user_id: Option<&str>,
        body: Option<&B>,
    ) -> ClientResult<()>
    where
        B: Serialize + Sync,
    {
        let url = self.url(path, user_id)?;
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request, path).await.map(|_| ())
    }
}

#[async_trait]
impl ProfileDirectory for BackendClient {
    async fn authorization_record(&self, identity: &Identity) -> Result<Value, SessionError> {
        self.profile_record(identity.as_str())
            .await
            .map_err(|error| match error {
                ClientError::Decode { .. } => SessionError::MalformedAuthorizationPayload {
                    detail: error.to_string(),
                },
                other => SessionError::AuthorizationLookupFailed {
                    detail: other.to_string(),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::NaiveDate;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> Result<BackendClient> {
        Ok(BackendClient::new(Client::new(), server.base_url().parse()?))
    }

    #[tokio::test]
    async fn authorization_record_queries_me_endpoint() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/user-profile/me")
                .query_param("userId", "user-7");
            then.status(200)
                .json_body(json!({"userId": "user-7", "admin": true}));
        });

        let record = client_for(&server)?
            .authorization_record(&Identity::new("user-7"))
            .await;

        mock.assert();
        assert_eq!(record, Ok(json!({"userId": "user-7", "admin": true})));
        Ok(())
    }

    #[tokio::test]
    async fn authorization_failures_are_classified() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).query_param("userId", "missing");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(GET).query_param("userId", "garbled");
            then.status(200).body("<html>");
        });
        let client = client_for(&server)?;

        assert!(matches!(
            client.authorization_record(&Identity::new("missing")).await,
            Err(SessionError::AuthorizationLookupFailed { .. })
        ));
        assert!(matches!(
            client.authorization_record(&Identity::new("garbled")).await,
            Err(SessionError::MalformedAuthorizationPayload { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn memos_round_trip_through_routes() -> Result<()> {
        let server = MockServer::start_async().await;
        let create = server.mock(|when, then| {
            when.method(POST)
                .path("/api/memos")
                .json_body(json!({"title": "standup", "content": "notes"}));
            then.status(201);
        });
        let list = server.mock(|when, then| {
            when.method(GET).path("/api/memos");
            then.status(200)
                .json_body(json!([{"id": 1, "title": "standup", "content": "notes"}]));
        });
        let client = client_for(&server)?;

        client
            .create_memo(&MemoRequest::new("standup", "notes")?)
            .await?;
        let memos = client.list_memos().await?;

        create.assert();
        list.assert();
        assert_eq!(memos.len(), 1);
        assert_eq!(memos[0].title, "standup");
        Ok(())
    }

    #[tokio::test]
    async fn today_attendance_tolerates_absence() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/attendance/today")
                .query_param("userId", "none");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/attendance/today")
                .query_param("userId", "null");
            then.status(200).body("null");
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/attendance/today")
                .query_param("userId", "present");
            then.status(200).json_body(json!({
                "id": 9,
                "workDate": "2025-04-01",
                "startTime": "2025-04-01T09:00:00",
                "status": "WORKING"
            }));
        });
        let client = client_for(&server)?;

        assert_eq!(client.today_attendance("none").await?, None);
        assert_eq!(client.today_attendance("null").await?, None);
        let record = client
            .today_attendance("present")
            .await?
            .ok_or_else(|| anyhow::anyhow!("expected a record"))?;
        assert_eq!(Some(record.work_date), NaiveDate::from_ymd_opt(2025, 4, 1));
        Ok(())
    }

    #[tokio::test]
    async fn punches_use_post_for_start_and_put_otherwise() -> Result<()> {
        let server = MockServer::start_async().await;
        let start = server.mock(|when, then| {
            when.method(POST)
                .path("/api/attendance/start")
                .query_param("userId", "user-42");
            then.status(200);
        });
        let break_start = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/attendance/break-start")
                .query_param("userId", "user-42");
            then.status(200);
        });
        let client = client_for(&server)?;

        client.punch("user-42", Punch::Start).await?;
        client.punch("user-42", Punch::BreakStart).await?;

        start.assert();
        break_start.assert();
        Ok(())
    }

    #[tokio::test]
    async fn missing_profile_is_blank() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/user-profile")
                .query_param("userId", "user-42");
            then.status(404);
        });

        let profile = client_for(&server)?.user_profile("user-42").await?;

        assert_eq!(profile, UserProfile::blank("user-42"));
        Ok(())
    }

    #[tokio::test]
    async fn expense_mutation_failures_surface_status() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(DELETE).path("/api/expense-reports/3");
            then.status(500).body("boom");
        });

        let err = client_for(&server)?
            .delete_expense_report(3)
            .await
            .expect_err("500 is an error");

        assert!(matches!(err, ClientError::Status { status: 500, ref body, .. } if body == "boom"));
        Ok(())
    }
}
