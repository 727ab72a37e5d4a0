//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use chrono::{NaiveDateTime, TimeDelta};
use kintai_api_models::{AttendanceRecord, ExpenseReport, Memo, UserProfile};
use kintai_session::SessionContext;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_session(session: &SessionContext, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "identity": session.identity(),
            "privileged": session.is_privileged(),
            "profile": session.profile().map(|profile| Value::Object(profile.record().clone())),
        })),
        OutputFormat::Table => {
            println!("identity: {}", session.identity());
            println!(
                "role: {}",
                if session.is_privileged() {
                    "administrator"
                } else {
                    "member"
                }
            );
            if session.profile().is_none() {
                println!("profile: unavailable");
            }
            Ok(())
        }
    }
}

pub(crate) fn render_profile_record(record: &Map<String, Value>) -> CliResult<()> {
    print_json(record)
}

pub(crate) fn render_memos(memos: &[Memo], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(memos),
        OutputFormat::Table => {
            println!("{:>6} {:<24} CONTENT", "ID", "TITLE");
            for memo in memos {
                println!(
                    "{:>6} {:<24} {}",
                    memo.id,
                    truncate(&memo.title, 24),
                    memo.content.replace('\n', " ")
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn render_attendance(
    records: &[AttendanceRecord],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(records),
        OutputFormat::Table => {
            println!(
                "{:>6} {:<10} {:>5} {:>13} {:>5} {:>7} STATUS",
                "ID", "DATE", "IN", "BREAK", "OUT", "WORKED"
            );
            for record in records {
                println!(
                    "{:>6} {:<10} {:>5} {:>13} {:>5} {:>7} {}",
                    record.id,
                    record.work_date.format("%Y-%m-%d"),
                    format_clock(Some(record.start_time)),
                    format!(
                        "{}-{}",
                        format_clock(record.break_start_time),
                        format_clock(record.break_end_time)
                    ),
                    format_clock(record.end_time),
                    record.worked().map_or_else(|| "-".to_string(), format_duration),
                    record.status
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn render_today(
    record: Option<&AttendanceRecord>,
    format: OutputFormat,
) -> CliResult<()> {
    match (format, record) {
        (OutputFormat::Json, record) => print_json(&record),
        (OutputFormat::Table, None) => {
            println!("not clocked in today");
            Ok(())
        }
        (OutputFormat::Table, Some(record)) => {
            println!("date: {}", record.work_date.format("%Y-%m-%d"));
            println!("clock in: {}", format_clock(Some(record.start_time)));
            println!("break start: {}", format_clock(record.break_start_time));
            println!("break end: {}", format_clock(record.break_end_time));
            println!("clock out: {}", format_clock(record.end_time));
            println!("status: {}", record.status);
            if let Some(next) = record.next_punch() {
                println!("next: {}", next.path_segment());
            }
            Ok(())
        }
    }
}

pub(crate) fn render_expenses(reports: &[ExpenseReport], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(reports),
        OutputFormat::Table => {
            println!(
                "{:>6} {:<10} {:<28} {:<8} {:>12} {:<8} PURPOSE",
                "ID", "DATE", "ROUTE", "METHOD", "AMOUNT", "STATUS"
            );
            for report in reports {
                let route = format!(
                    "{} → {}",
                    report.departure_location, report.arrival_location
                );
                println!(
                    "{:>6} {:<10} {:<28} {:<8} {:>12} {:<8} {}{}",
                    report.id,
                    report.expense_date.format("%Y-%m-%d"),
                    truncate(&route, 28),
                    report.transportation_method,
                    format_yen(report.amount),
                    report.status.label(),
                    report.purpose,
                    if report.receipt_attached {
                        " [receipt]"
                    } else {
                        ""
                    }
                );
            }
            let total: i64 = reports.iter().map(|report| report.amount).sum();
            println!("total: {}", format_yen(total));
            Ok(())
        }
    }
}

pub(crate) fn render_user_profile(profile: &UserProfile, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(profile),
        OutputFormat::Table => {
            println!("user: {}", profile.user_id);
            let rows = [
                ("display name", &profile.display_name),
                ("email", &profile.email),
                ("phone", &profile.phone_number),
                ("postal code", &profile.postal_code),
                ("prefecture", &profile.prefecture),
                ("city", &profile.city),
                ("address", &profile.address_line),
                ("building", &profile.building),
                ("department", &profile.department),
                ("position", &profile.position),
                ("employee number", &profile.employee_number),
                ("hire date", &profile.hire_date),
                ("birth date", &profile.birth_date),
                ("emergency contact", &profile.emergency_contact_name),
                ("emergency phone", &profile.emergency_contact_phone),
            ];
            for (label, value) in rows {
                println!("{label}: {}", value.as_deref().unwrap_or("-"));
            }
            Ok(())
        }
    }
}

/// `1234567` becomes `1,234,567円`.
#[must_use]
pub(crate) fn format_yen(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{grouped}円")
}

#[must_use]
pub(crate) fn format_clock(time: Option<NaiveDateTime>) -> String {
    time.map_or_else(|| "--:--".to_string(), |time| time.format("%H:%M").to_string())
}

#[must_use]
pub(crate) fn format_duration(duration: TimeDelta) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yen_amounts_are_grouped() {
        assert_eq!(format_yen(0), "0円");
        assert_eq!(format_yen(980), "980円");
        assert_eq!(format_yen(1_000), "1,000円");
        assert_eq!(format_yen(1_234_567), "1,234,567円");
        assert_eq!(format_yen(-45_000), "-45,000円");
    }

    #[test]
    fn clock_and_duration_formatting() {
        let time = NaiveDateTime::parse_from_str("2025-04-01 09:05:00", "%Y-%m-%d %H:%M:%S")
            .expect("timestamp");
        assert_eq!(format_clock(Some(time)), "09:05");
        assert_eq!(format_clock(None), "--:--");
        assert_eq!(format_duration(TimeDelta::minutes(485)), "8:05");
        assert_eq!(format_duration(TimeDelta::minutes(-3)), "0:00");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
