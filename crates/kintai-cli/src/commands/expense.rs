//! Expense page: travel expense reports for the signed-in employee.

use kintai_api_models::{ExpenseDraft, ExpenseReport};
use tracing::{info, warn};

use crate::cli::{ExpenseAddArgs, ExpenseEditArgs, OutputFormat, RecordIdArgs};
use crate::client::{AppContext, CliError, CliResult, classify_client_error};
use crate::output::{format_yen, render_expenses};
use crate::page::require_session;

pub(crate) async fn handle_list(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let session = require_session(ctx).await?;
    let reports = ctx
        .backend
        .list_expense_reports(session.identity().as_str())
        .await
        .unwrap_or_else(|err| {
            warn!(error = %err, "expense list unavailable");
            Vec::new()
        });
    render_expenses(&reports, format)
}

pub(crate) async fn handle_add(ctx: &AppContext, args: ExpenseAddArgs) -> CliResult<()> {
    let session = require_session(ctx).await?;
    let request = draft_from_args(args).into_request(session.identity().as_str())?;

    ctx.backend
        .create_expense_report(&request)
        .await
        .map_err(classify_client_error)?;
    info!(amount = request.amount, "expense report filed");
    println!(
        "filed expense report: {} → {} {}",
        request.departure_location,
        request.arrival_location,
        format_yen(request.amount)
    );
    Ok(())
}

pub(crate) async fn handle_edit(ctx: &AppContext, args: ExpenseEditArgs) -> CliResult<()> {
    let session = require_session(ctx).await?;
    let user_id = session.identity().as_str();
    let reports = ctx
        .backend
        .list_expense_reports(user_id)
        .await
        .map_err(classify_client_error)?;
    let report = find_report(&reports, args.id)?;

    let id = report.id;
    let request = overlay_draft(ExpenseDraft::from_report(report), args).into_request(user_id)?;
    ctx.backend
        .update_expense_report(id, &request)
        .await
        .map_err(classify_client_error)?;
    println!("updated expense report {id}");
    Ok(())
}

pub(crate) async fn handle_delete(ctx: &AppContext, args: RecordIdArgs) -> CliResult<()> {
    require_session(ctx).await?;
    ctx.backend
        .delete_expense_report(args.id)
        .await
        .map_err(classify_client_error)?;
    println!("deleted expense report {}", args.id);
    Ok(())
}

fn find_report(reports: &[ExpenseReport], id: i64) -> CliResult<&ExpenseReport> {
    reports
        .iter()
        .find(|report| report.id == id)
        .ok_or_else(|| CliError::validation(format!("expense report {id} not found")))
}

fn draft_from_args(args: ExpenseAddArgs) -> ExpenseDraft {
    ExpenseDraft {
        expense_date: args.date,
        departure_location: args.from,
        arrival_location: args.to,
        transportation_method: args.method,
        purpose: args.purpose,
        amount: args.amount,
        description: args.description,
        receipt_attached: args.receipt,
    }
}

fn overlay_draft(mut draft: ExpenseDraft, args: ExpenseEditArgs) -> ExpenseDraft {
    let ExpenseEditArgs {
        id: _,
        date,
        from,
        to,
        method,
        purpose,
        amount,
        description,
        receipt,
    } = args;
    let fields = [
        (&mut draft.expense_date, date),
        (&mut draft.departure_location, from),
        (&mut draft.arrival_location, to),
        (&mut draft.transportation_method, method),
        (&mut draft.purpose, purpose),
        (&mut draft.amount, amount),
        (&mut draft.description, description),
    ];
    for (slot, value) in fields {
        if let Some(value) = value {
            *slot = value;
        }
    }
    if let Some(receipt) = receipt {
        draft.receipt_attached = receipt;
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::context_with;
    use httpmock::prelude::*;
    use serde_json::{Value, json};

    fn report_json() -> Value {
        json!({
            "id": 5,
            "expenseDate": "2025-04-01",
            "departureLocation": "Shinjuku",
            "arrivalLocation": "Yokohama",
            "transportationMethod": "電車",
            "purpose": "Client visit",
            "amount": 580,
            "receiptAttached": false,
            "status": "PENDING",
            "createdAt": "2025-04-01T19:00:00"
        })
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
    fn overlay_keeps_untouched_fields() {
        let report: ExpenseReport = serde_json::from_value(report_json()).expect("report");
        let draft = overlay_draft(
            ExpenseDraft::from_report(&report),
            ExpenseEditArgs {
                id: 5,
                amount: Some("1200".to_string()),
                receipt: Some(true),
                ..ExpenseEditArgs::default()
            },
        );

        assert_eq!(draft.amount, "1200");
        assert!(draft.receipt_attached);
        assert_eq!(draft.departure_location, "Shinjuku");
        assert_eq!(draft.expense_date, "2025-04-01");
    }

    #[tokio::test]
    async fn add_posts_a_validated_report() {
        let identity = MockServer::start_async().await;
        let backend = MockServer::start_async().await;
        signed_in(&identity, &backend);
        let create = backend.mock(|when, then| {
            when.method(POST).path("/api/expense-reports").json_body(json!({
                "userId": "user-42",
                "expenseDate": "2025-04-01",
                "departureLocation": "Shinjuku",
                "arrivalLocation": "Yokohama",
                "transportationMethod": "電車",
                "purpose": "Client visit",
                "amount": 580,
                "description": "",
                "receiptAttached": true
            }));
            then.status(201);
        });
        let (ctx, _store) = context_with(&identity, &backend, Some("tok-A"));

        handle_add(
            &ctx,
            ExpenseAddArgs {
                date: "2025-04-01".to_string(),
                from: "Shinjuku".to_string(),
                to: "Yokohama".to_string(),
                purpose: "Client visit".to_string(),
                amount: "580".to_string(),
                receipt: true,
                ..ExpenseAddArgs::default()
            },
        )
        .await
        .expect("filed");

        create.assert();
    }

    #[tokio::test]
    async fn add_rejects_missing_amount_without_posting() {
        let identity = MockServer::start_async().await;
        let backend = MockServer::start_async().await;
        signed_in(&identity, &backend);
        let create = backend.mock(|when, then| {
            when.method(POST).path("/api/expense-reports");
            then.status(201);
        });
        let (ctx, _store) = context_with(&identity, &backend, Some("tok-A"));

        let err = handle_add(
            &ctx,
            ExpenseAddArgs {
                date: "2025-04-01".to_string(),
                from: "Shinjuku".to_string(),
                to: "Yokohama".to_string(),
                purpose: "Client visit".to_string(),
                ..ExpenseAddArgs::default()
            },
        )
        .await
        .expect_err("amount missing");

        assert!(matches!(err, CliError::Validation(ref message) if message.contains("amount")));
        assert_eq!(create.calls(), 0);
    }

    #[tokio::test]
    async fn edit_of_unknown_report_is_a_validation_error() {
        let identity = MockServer::start_async().await;
        let backend = MockServer::start_async().await;
        signed_in(&identity, &backend);
        backend.mock(|when, then| {
            when.method(GET)
                .path("/api/expense-reports")
                .query_param("userId", "user-42");
            then.status(200).json_body(json!([report_json()]));
        });
        let (ctx, _store) = context_with(&identity, &backend, Some("tok-A"));

        let err = handle_edit(
            &ctx,
            ExpenseEditArgs {
                id: 99,
                ..ExpenseEditArgs::default()
            },
        )
        .await
        .expect_err("unknown report");

        assert!(matches!(err, CliError::Validation(ref message) if message.contains("99")));
    }
}
