//! Profile page: view and edit the signed-in employee's details.

use kintai_api_models::UserProfilePatch;
use tracing::info;

use crate::cli::{OutputFormat, ProfileUpdateArgs};
use crate::client::{AppContext, CliResult, classify_client_error};
use crate::output::render_user_profile;
use crate::page::require_session;

pub(crate) async fn handle_show(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let session = require_session(ctx).await?;
    let profile = ctx
        .backend
        .user_profile(session.identity().as_str())
        .await
        .map_err(classify_client_error)?;
    render_user_profile(&profile, format)
}

/// Merge the flags into the stored profile and save it under the caller's
/// identity.
pub(crate) async fn handle_update(
    ctx: &AppContext,
    args: ProfileUpdateArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let session = require_session(ctx).await?;
    let user_id = session.identity().as_str();
    let mut profile = ctx
        .backend
        .user_profile(user_id)
        .await
        .map_err(classify_client_error)?;

    profile.apply(UserProfilePatch::from(args));
    user_id.clone_into(&mut profile.user_id);
    profile.validate()?;

    ctx.backend
        .save_user_profile(&profile)
        .await
        .map_err(classify_client_error)?;
    info!("profile saved");
    render_user_profile(&profile, format)
}

impl From<ProfileUpdateArgs> for UserProfilePatch {
    fn from(args: ProfileUpdateArgs) -> Self {
        Self {
            display_name: args.display_name,
            email: args.email,
            phone_number: args.phone,
            postal_code: args.postal_code,
            prefecture: args.prefecture,
            city: args.city,
            address_line: args.address,
            building: args.building,
            department: args.department,
            position: args.position,
            employee_number: args.employee_number,
            hire_date: args.hire_date,
            birth_date: args.birth_date,
            emergency_contact_name: args.emergency_contact_name,
            emergency_contact_phone: args.emergency_contact_phone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CliError;
    use crate::client::test_support::context_with;
    use httpmock::prelude::*;
    use serde_json::json;

    fn signed_in(identity: &MockServer, backend: &MockServer) {
        identity.mock(|when, then| {
            when.method(POST);
            then.status(200).json_body(json!({"Username": "user-42"}));
        });
        backend.mock(|when, then| {
            when.method(GET).path("/api/user-profile/me");
            then.status(200).json_body(json!({"userId": "user-42"}));
        });
    }

    #[tokio::test]
    async fn update_forces_the_identity_and_posts() {
        let identity = MockServer::start_async().await;
        let backend = MockServer::start_async().await;
        signed_in(&identity, &backend);
        backend.mock(|when, then| {
            when.method(GET)
                .path("/api/user-profile")
                .query_param("userId", "user-42");
            then.status(200).json_body(json!({
                "id": 3,
                "userId": "someone-else",
                "city": "Sapporo"
            }));
        });
        let save = backend.mock(|when, then| {
            when.method(POST).path("/api/user-profile").json_body(json!({
                "id": 3,
                "userId": "user-42",
                "displayName": "Ren",
                "prefecture": "北海道",
                "city": "Sapporo"
            }));
            then.status(200);
        });
        let (ctx, _store) = context_with(&identity, &backend, Some("tok-A"));

        handle_update(
            &ctx,
            ProfileUpdateArgs {
                display_name: Some("Ren".to_string()),
                prefecture: Some("北海道".to_string()),
                ..ProfileUpdateArgs::default()
            },
            OutputFormat::Json,
        )
        .await
        .expect("profile saved");

        save.assert();
    }

    #[tokio::test]
    async fn unknown_prefecture_is_rejected_before_saving() {
        let identity = MockServer::start_async().await;
        let backend = MockServer::start_async().await;
        signed_in(&identity, &backend);
        backend.mock(|when, then| {
            when.method(GET).path("/api/user-profile");
            then.status(404);
        });
        let save = backend.mock(|when, then| {
            when.method(POST).path("/api/user-profile");
            then.status(200);
        });
        let (ctx, _store) = context_with(&identity, &backend, Some("tok-A"));

        let err = handle_update(
            &ctx,
            ProfileUpdateArgs {
                prefecture: Some("Atlantis".to_string()),
                ..ProfileUpdateArgs::default()
            },
            OutputFormat::Table,
        )
        .await
        .expect_err("invalid prefecture");

        assert!(matches!(err, CliError::Validation(ref message) if message.contains("Atlantis")));
        assert_eq!(save.calls(), 0);
    }
}
