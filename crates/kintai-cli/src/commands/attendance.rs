//! Attendance page: today's time clock, history, and record corrections.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use kintai_api_models::{AttendanceRecord, AttendanceUpdateRequest, Punch};
use kintai_session::SessionContext;
use tracing::{info, warn};

use crate::cli::{AttendanceEditArgs, OutputFormat, RecordIdArgs};
use crate::client::{AppContext, CliError, CliResult, classify_client_error};
use crate::output::{render_attendance, render_today};
use crate::page::require_session;

pub(crate) async fn handle_list(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let session = require_session(ctx).await?;
    let records = ctx
        .backend
        .list_attendance(session.identity().as_str())
        .await
        .unwrap_or_else(|err| {
            warn!(error = %err, "attendance list unavailable");
            Vec::new()
        });
    render_attendance(&records, format)
}

pub(crate) async fn handle_today(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let session = require_session(ctx).await?;
    let today = fetch_today(ctx, &session).await;
    render_today(today.as_ref(), format)
}

/// Record a punch after checking it fits today's record, then show the
/// refreshed record.
pub(crate) async fn handle_punch(
    ctx: &AppContext,
    punch: Punch,
    format: OutputFormat,
) -> CliResult<()> {
    let session = require_session(ctx).await?;
    let user_id = session.identity().as_str();
    let today = ctx
        .backend
        .today_attendance(user_id)
        .await
        .map_err(classify_client_error)?;
    check_punch(today.as_ref(), punch)?;

    ctx.backend
        .punch(user_id, punch)
        .await
        .map_err(classify_client_error)?;
    info!(punch = punch.path_segment(), "punch recorded");

    let today = fetch_today(ctx, &session).await;
    render_today(today.as_ref(), format)
}

pub(crate) async fn handle_edit(ctx: &AppContext, args: AttendanceEditArgs) -> CliResult<()> {
    let session = require_session(ctx).await?;
    let records = ctx
        .backend
        .list_attendance(session.identity().as_str())
        .await
        .map_err(classify_client_error)?;
    let record = records
        .iter()
        .find(|record| record.id == args.id)
        .ok_or_else(|| CliError::validation(format!("attendance record {} not found", args.id)))?;

    let update = apply_edit(record, &args)?;
    ctx.backend
        .update_attendance(record.id, &update)
        .await
        .map_err(classify_client_error)?;
    println!("updated attendance record {}", record.id);
    Ok(())
}

pub(crate) async fn handle_delete(ctx: &AppContext, args: RecordIdArgs) -> CliResult<()> {
    require_session(ctx).await?;
    ctx.backend
        .delete_attendance(args.id)
        .await
        .map_err(classify_client_error)?;
    println!("deleted attendance record {}", args.id);
    Ok(())
}

async fn fetch_today(ctx: &AppContext, session: &SessionContext) -> Option<AttendanceRecord> {
    ctx.backend
        .today_attendance(session.identity().as_str())
        .await
        .unwrap_or_else(|err| {
            warn!(error = %err, "today's attendance unavailable");
            None
        })
}

fn check_punch(today: Option<&AttendanceRecord>, punch: Punch) -> CliResult<()> {
    match (today, punch) {
        (None, Punch::Start) => Ok(()),
        (Some(_), Punch::Start) => Err(CliError::validation("already clocked in today")),
        (None, _) => Err(CliError::validation("not clocked in today")),
        (Some(record), _) if record.end_time.is_some() => {
            Err(CliError::validation("already clocked out today"))
        }
        (Some(record), Punch::BreakEnd) if record.break_start_time.is_none() => {
            Err(CliError::validation("no break in progress"))
        }
        (Some(record), Punch::BreakStart | Punch::BreakEnd)
            if record.break_end_time.is_some() =>
        {
            Err(CliError::validation("break already taken today"))
        }
        (Some(record), Punch::BreakStart) if record.break_start_time.is_some() => {
            Err(CliError::validation("break already started"))
        }
        (Some(_), _) => Ok(()),
    }
}

fn apply_edit(
    record: &AttendanceRecord,
    args: &AttendanceEditArgs,
) -> CliResult<AttendanceUpdateRequest> {
    let mut update = AttendanceUpdateRequest::from(record);
    let date = record.work_date;

    if let Some(value) = &args.start {
        update.start_time = parse_clock("start", date, value)?
            .ok_or_else(|| CliError::validation("start time cannot be cleared"))?;
    }
    if let Some(value) = &args.break_start {
        update.break_start_time = parse_clock("break-start", date, value)?;
    }
    if let Some(value) = &args.break_end {
        update.break_end_time = parse_clock("break-end", date, value)?;
    }
    if let Some(value) = &args.end {
        update.end_time = parse_clock("end", date, value)?;
    }
    if let Some(status) = &args.status {
        let status = status.trim();
        if status.is_empty() {
            return Err(CliError::validation("status cannot be empty"));
        }
        update.status = status.to_string();
    }

    if update.end_time.is_some_and(|end| end < update.start_time) {
        return Err(CliError::validation("end time is before start time"));
    }
    Ok(update)
}

/// `HH:MM` on the record's day; an empty value clears the time.
fn parse_clock(field: &str, date: NaiveDate, value: &str) -> CliResult<Option<NaiveDateTime>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map(|time| Some(date.and_time(time)))
        .map_err(|_| CliError::validation(format!("--{field} must be a time in HH:MM form")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::context_with;
    use httpmock::prelude::*;
    use serde_json::json;

    fn record() -> AttendanceRecord {
        serde_json::from_value(json!({
            "id": 11,
            "workDate": "2025-04-01",
            "startTime": "2025-04-01T09:00:00",
            "breakStartTime": "2025-04-01T12:00:00",
            "status": "ON_BREAK"
        }))
        .expect("record")
    }

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

    #[test]
    fn punches_follow_the_day() {
        assert!(check_punch(None, Punch::Start).is_ok());
        assert!(check_punch(None, Punch::End).is_err());

        let on_break = record();
        assert!(check_punch(Some(&on_break), Punch::Start).is_err());
        assert!(check_punch(Some(&on_break), Punch::BreakStart).is_err());
        assert!(check_punch(Some(&on_break), Punch::BreakEnd).is_ok());
        assert!(check_punch(Some(&on_break), Punch::End).is_ok());

        let mut finished = record();
        finished.end_time = finished.break_start_time;
        assert!(check_punch(Some(&finished), Punch::End).is_err());
    }

    #[test]
    fn edit_overlays_times_on_the_work_date() {
        let args = AttendanceEditArgs {
            id: 11,
            break_start: Some(String::new()),
            end: Some("18:30".to_string()),
            status: Some("FINISHED".to_string()),
            ..AttendanceEditArgs::default()
        };

        let update = apply_edit(&record(), &args).expect("valid edit");

        assert_eq!(update.break_start_time, None);
        assert_eq!(
            update.end_time.map(|end| end.format("%Y-%m-%d %H:%M").to_string()),
            Some("2025-04-01 18:30".to_string())
        );
        assert_eq!(update.status, "FINISHED");
    }

    #[test]
    fn edit_rejects_malformed_or_inverted_times() {
        let malformed = AttendanceEditArgs {
            id: 11,
            end: Some("6pm".to_string()),
            ..AttendanceEditArgs::default()
        };
        assert!(matches!(apply_edit(&record(), &malformed), Err(CliError::Validation(_))));

        let inverted = AttendanceEditArgs {
            id: 11,
            end: Some("08:00".to_string()),
            ..AttendanceEditArgs::default()
        };
        assert!(apply_edit(&record(), &inverted).is_err());

        let cleared_start = AttendanceEditArgs {
            id: 11,
            start: Some(String::new()),
            ..AttendanceEditArgs::default()
        };
        assert!(apply_edit(&record(), &cleared_start).is_err());
    }

    #[tokio::test]
    async fn clock_in_posts_with_the_identity() {
        let identity = MockServer::start_async().await;
        let backend = MockServer::start_async().await;
        signed_in(&identity, &backend);
        backend.mock(|when, then| {
            when.method(GET)
                .path("/api/attendance/today")
                .query_param("userId", "user-42");
            then.status(404);
        });
        let start = backend.mock(|when, then| {
            when.method(POST)
                .path("/api/attendance/start")
                .query_param("userId", "user-42");
            then.status(200);
        });
        let (ctx, _store) = context_with(&identity, &backend, Some("tok-A"));

        handle_punch(&ctx, Punch::Start, OutputFormat::Table)
            .await
            .expect("clocked in");

        start.assert();
    }

    #[tokio::test]
    async fn edit_puts_the_merged_record() {
        let identity = MockServer::start_async().await;
        let backend = MockServer::start_async().await;
        signed_in(&identity, &backend);
        backend.mock(|when, then| {
            when.method(GET)
                .path("/api/attendance")
                .query_param("userId", "user-42");
            then.status(200).json_body(json!([{
                "id": 11,
                "workDate": "2025-04-01",
                "startTime": "2025-04-01T09:00:00",
                "status": "WORKING"
            }]));
        });
        let put = backend.mock(|when, then| {
            when.method(PUT).path("/api/attendance/11").json_body(json!({
                "startTime": "2025-04-01T09:00:00",
                "breakStartTime": null,
                "breakEndTime": null,
                "endTime": "2025-04-01T18:00:00",
                "status": "WORKING"
            }));
            then.status(200);
        });
        let (ctx, _store) = context_with(&identity, &backend, Some("tok-A"));

        handle_edit(
            &ctx,
            AttendanceEditArgs {
                id: 11,
                end: Some("18:00".to_string()),
                ..AttendanceEditArgs::default()
            },
        )
        .await
        .expect("edited");

        put.assert();
    }

    #[tokio::test]
    async fn delete_requires_a_session() {
        let identity = MockServer::start_async().await;
        let backend = MockServer::start_async().await;
        let delete = backend.mock(|when, then| {
            when.method(DELETE);
            then.status(200);
        });
        let (ctx, _store) = context_with(&identity, &backend, None);

        let err = handle_delete(&ctx, RecordIdArgs { id: 11 })
            .await
            .expect_err("not signed in");

        assert!(matches!(err, CliError::Unauthenticated { .. }));
        assert_eq!(delete.calls(), 0);
    }
}
