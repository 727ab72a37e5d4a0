#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Kintai backend.
//!
//! The backend speaks camelCase JSON. Request types validate their own
//! required fields so every client surface rejects the same inputs before a
//! request is sent.
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transportation method pre-selected on new expense reports.
pub const DEFAULT_TRANSPORTATION_METHOD: &str = "電車";

/// The 47 prefectures accepted in profile addresses.
pub const PREFECTURES: [&str; 47] = [
    "北海道", "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県", "茨城県", "栃木県",
    "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県", "新潟県", "富山県", "石川県", "福井県",
    "山梨県", "長野県", "岐阜県", "静岡県", "愛知県", "三重県", "滋賀県", "京都府", "大阪府",
    "兵庫県", "奈良県", "和歌山県", "鳥取県", "島根県", "岡山県", "広島県", "山口県", "徳島県",
    "香川県", "愛媛県", "高知県", "福岡県", "佐賀県", "長崎県", "熊本県", "大分県", "宮崎県",
    "鹿児島県", "沖縄県",
];

/// Input rejected before it reaches the backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty.
    #[error("'{field}' is required")]
    MissingField {
        /// Wire name of the field.
        field: &'static str,
    },
    /// A date did not parse as `YYYY-MM-DD`.
    #[error("'{field}' must be a date in YYYY-MM-DD form")]
    InvalidDate {
        /// Wire name of the field.
        field: &'static str,
        /// Offending input.
        value: String,
    },
    /// The amount was not a positive whole number of yen.
    #[error("amount must be a positive whole number of yen")]
    InvalidAmount {
        /// Offending input.
        value: String,
    },
    /// The prefecture is not one of [`PREFECTURES`].
    #[error("unknown prefecture '{value}'")]
    UnknownPrefecture {
        /// Offending input.
        value: String,
    },
}

/// Memo as listed by `GET /api/memos`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Memo {
    /// Backend identifier.
    pub id: i64,
    /// Memo title.
    pub title: String,
    /// Memo body.
    pub content: String,
}

/// Body of `POST /api/memos`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoRequest {
    /// Memo title.
    pub title: String,
    /// Memo body.
    pub content: String,
}

impl MemoRequest {
    /// Build a memo request, requiring a non-blank title.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] when the title is blank.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "title" });
        }
        Ok(Self {
            title,
            content: content.into(),
        })
    }
}

/// One day's attendance record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// Backend identifier.
    pub id: i64,
    /// Working day.
    pub work_date: NaiveDate,
    /// Clock-in time.
    pub start_time: NaiveDateTime,
    /// Break start, when taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_start_time: Option<NaiveDateTime>,
    /// Break end, when taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_end_time: Option<NaiveDateTime>,
    /// Clock-out time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveDateTime>,
    /// Backend status label.
    pub status: String,
}

impl AttendanceRecord {
    /// Time worked excluding a completed break; `None` until clocked out.
    #[must_use]
    pub fn worked(&self) -> Option<TimeDelta> {
        let end = self.end_time?;
        let mut worked = end - self.start_time;
        if let (Some(break_start), Some(break_end)) = (self.break_start_time, self.break_end_time)
        {
            worked -= break_end - break_start;
        }
        Some(worked.max(TimeDelta::zero()))
    }

    /// Next punch this record accepts.
    #[must_use]
    pub const fn next_punch(&self) -> Option<Punch> {
        match (self.break_start_time, self.break_end_time, self.end_time) {
            (_, _, Some(_)) => None,
            (None, _, None) => Some(Punch::BreakStart),
            (Some(_), None, None) => Some(Punch::BreakEnd),
            (Some(_), Some(_), None) => Some(Punch::End),
        }
    }
}

/// Time-clock actions on today's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punch {
    /// Clock in (`POST /api/attendance/start`).
    Start,
    /// Start a break (`PUT /api/attendance/break-start`).
    BreakStart,
    /// End a break (`PUT /api/attendance/break-end`).
    BreakEnd,
    /// Clock out (`PUT /api/attendance/end`).
    End,
}

impl Punch {
    /// Path segment under `/api/attendance/`.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::BreakStart => "break-start",
            Self::BreakEnd => "break-end",
            Self::End => "end",
        }
    }

    /// Clock-in creates the record; the other punches update it.
    #[must_use]
    pub const fn creates_record(self) -> bool {
        matches!(self, Self::Start)
    }
}

/// Body of `PUT /api/attendance/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceUpdateRequest {
    /// Clock-in time.
    pub start_time: NaiveDateTime,
    /// Break start.
    pub break_start_time: Option<NaiveDateTime>,
    /// Break end.
    pub break_end_time: Option<NaiveDateTime>,
    /// Clock-out time.
    pub end_time: Option<NaiveDateTime>,
    /// Status label.
    pub status: String,
}

impl From<&AttendanceRecord> for AttendanceUpdateRequest {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            start_time: record.start_time,
            break_start_time: record.break_start_time,
            break_end_time: record.break_end_time,
            end_time: record.end_time,
            status: record.status.clone(),
        }
    }
}

/// Approval state of an expense report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    /// Submitted, awaiting review.
    Pending,
    /// Approved by a reviewer.
    Approved,
    /// Rejected by a reviewer.
    Rejected,
    /// Any status this client does not know yet.
    #[serde(other)]
    Unknown,
}

impl ExpenseStatus {
    /// Short display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }
}

/// Expense report as listed by `GET /api/expense-reports`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseReport {
    /// Backend identifier.
    pub id: i64,
    /// Date the expense was incurred.
    pub expense_date: NaiveDate,
    /// Journey origin.
    pub departure_location: String,
    /// Journey destination.
    pub arrival_location: String,
    /// Train, bus, taxi, ...
    pub transportation_method: String,
    /// Business purpose.
    pub purpose: String,
    /// Amount in yen.
    pub amount: i64,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether a receipt is attached.
    pub receipt_attached: bool,
    /// Approval state.
    pub status: ExpenseStatus,
    /// Submission timestamp.
    pub created_at: NaiveDateTime,
}

/// Body of `POST /api/expense-reports` and `PUT /api/expense-reports/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseReportRequest {
    /// Owner identity.
    pub user_id: String,
    /// Date the expense was incurred.
    pub expense_date: NaiveDate,
    /// Journey origin.
    pub departure_location: String,
    /// Journey destination.
    pub arrival_location: String,
    /// Train, bus, taxi, ...
    pub transportation_method: String,
    /// Business purpose.
    pub purpose: String,
    /// Amount in yen.
    pub amount: i64,
    /// Free-form notes.
    pub description: String,
    /// Whether a receipt is attached.
    pub receipt_attached: bool,
}

/// Unvalidated expense form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseDraft {
    /// `YYYY-MM-DD`.
    pub expense_date: String,
    /// Journey origin.
    pub departure_location: String,
    /// Journey destination.
    pub arrival_location: String,
    /// Defaults to [`DEFAULT_TRANSPORTATION_METHOD`] when blank.
    pub transportation_method: String,
    /// Business purpose.
    pub purpose: String,
    /// Amount in yen as typed.
    pub amount: String,
    /// Free-form notes.
    pub description: String,
    /// Whether a receipt is attached.
    pub receipt_attached: bool,
}

impl ExpenseDraft {
    /// Pre-fill a draft from an existing report for editing.
    #[must_use]
    pub fn from_report(report: &ExpenseReport) -> Self {
        Self {
            expense_date: report.expense_date.format("%Y-%m-%d").to_string(),
            departure_location: report.departure_location.clone(),
            arrival_location: report.arrival_location.clone(),
            transportation_method: report.transportation_method.clone(),
            purpose: report.purpose.clone(),
            amount: report.amount.to_string(),
            description: report.description.clone().unwrap_or_default(),
            receipt_attached: report.receipt_attached,
        }
    }

    /// Validate the draft and attach the owner identity.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a required field is blank, the date
    /// does not parse, or the amount is not a positive integer.
    pub fn into_request(self, user_id: &str) -> Result<ExpenseReportRequest, ValidationError> {
        let required = [
            ("expenseDate", &self.expense_date),
            ("departureLocation", &self.departure_location),
            ("arrivalLocation", &self.arrival_location),
            ("purpose", &self.purpose),
            ("amount", &self.amount),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ValidationError::MissingField { field: *field });
        }

        let expense_date = parse_date("expenseDate", &self.expense_date)?;
        let amount = self
            .amount
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|amount| *amount > 0)
            .ok_or_else(|| ValidationError::InvalidAmount {
                value: self.amount.clone(),
            })?;
        let transportation_method = if self.transportation_method.trim().is_empty() {
            DEFAULT_TRANSPORTATION_METHOD.to_string()
        } else {
            self.transportation_method
        };

        Ok(ExpenseReportRequest {
            user_id: user_id.to_string(),
            expense_date,
            departure_location: self.departure_location,
            arrival_location: self.arrival_location,
            transportation_method,
            purpose: self.purpose,
            amount,
            description: self.description,
            receipt_attached: self.receipt_attached,
        })
    }
}

/// Parse a `YYYY-MM-DD` form value.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDate`] when the value does not parse.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Employee profile served by `/api/user-profile`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Backend identifier, absent before the first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Owner identity.
    pub user_id: String,
    /// Name shown in the UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// One of [`PREFECTURES`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefecture: Option<String>,
    /// City or ward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line: Option<String>,
    /// Building and room.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    /// Department.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Job title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// Employee number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<String>,
    /// Hire date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<String>,
    /// Birth date, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// Emergency contact name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    /// Emergency contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
}

impl UserProfile {
    /// Empty profile for a caller who has not saved one yet.
    #[must_use]
    pub fn blank(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Self::default()
        }
    }

    /// Overlay the set fields of `patch`; empty strings clear a field.
    pub fn apply(&mut self, patch: UserProfilePatch) {
        let UserProfilePatch {
            display_name,
            email,
            phone_number,
            postal_code,
            prefecture,
            city,
            address_line,
            building,
            department,
            position,
            employee_number,
            hire_date,
            birth_date,
            emergency_contact_name,
            emergency_contact_phone,
        } = patch;
        let pairs = [
            (&mut self.display_name, display_name),
            (&mut self.email, email),
            (&mut self.phone_number, phone_number),
            (&mut self.postal_code, postal_code),
            (&mut self.prefecture, prefecture),
            (&mut self.city, city),
            (&mut self.address_line, address_line),
            (&mut self.building, building),
            (&mut self.department, department),
            (&mut self.position, position),
            (&mut self.employee_number, employee_number),
            (&mut self.hire_date, hire_date),
            (&mut self.birth_date, birth_date),
            (&mut self.emergency_contact_name, emergency_contact_name),
            (&mut self.emergency_contact_phone, emergency_contact_phone),
        ];
        for (slot, value) in pairs {
            if let Some(value) = value {
                *slot = if value.trim().is_empty() {
                    None
                } else {
                    Some(value)
                };
            }
        }
    }

    /// Check field formats before saving.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an unknown prefecture or a malformed
    /// hire/birth date.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(prefecture) = &self.prefecture {
            if !PREFECTURES.contains(&prefecture.as_str()) {
                return Err(ValidationError::UnknownPrefecture {
                    value: prefecture.clone(),
                });
            }
        }
        if let Some(date) = &self.hire_date {
            parse_date("hireDate", date)?;
        }
        if let Some(date) = &self.birth_date {
            parse_date("birthDate", date)?;
        }
        Ok(())
    }
}

/// Field-level changes to a [`UserProfile`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfilePatch {
    /// See [`UserProfile::display_name`].
    pub display_name: Option<String>,
    /// See [`UserProfile::email`].
    pub email: Option<String>,
    /// See [`UserProfile::phone_number`].
    pub phone_number: Option<String>,
    /// See [`UserProfile::postal_code`].
    pub postal_code: Option<String>,
    /// See [`UserProfile::prefecture`].
    pub prefecture: Option<String>,
    /// See [`UserProfile::city`].
    pub city: Option<String>,
    /// See [`UserProfile::address_line`].
    pub address_line: Option<String>,
    /// See [`UserProfile::building`].
    pub building: Option<String>,
    /// See [`UserProfile::department`].
    pub department: Option<String>,
    /// See [`UserProfile::position`].
    pub position: Option<String>,
    /// See [`UserProfile::employee_number`].
    pub employee_number: Option<String>,
    /// See [`UserProfile::hire_date`].
    pub hire_date: Option<String>,
    /// See [`UserProfile::birth_date`].
    pub birth_date: Option<String>,
    /// See [`UserProfile::emergency_contact_name`].
    pub emergency_contact_name: Option<String>,
    /// See [`UserProfile::emergency_contact_phone`].
    pub emergency_contact_phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S")
            .expect("timestamp")
    }

    fn draft() -> ExpenseDraft {
        ExpenseDraft {
            expense_date: "2025-04-01".to_string(),
            departure_location: "Shinjuku".to_string(),
            arrival_location: "Yokohama".to_string(),
            transportation_method: String::new(),
            purpose: "Client visit".to_string(),
            amount: " 580 ".to_string(),
            description: String::new(),
            receipt_attached: true,
        }
    }

    #[test]
    fn attendance_record_parses_backend_payload() {
        let record: AttendanceRecord = serde_json::from_value(json!({
            "id": 3,
            "workDate": "2025-04-01",
            "startTime": "2025-04-01T09:02:11",
            "breakStartTime": "2025-04-01T12:00:00.250",
            "breakEndTime": null,
            "status": "WORKING"
        }))
        .expect("attendance record");
        assert_eq!(record.work_date, NaiveDate::from_ymd_opt(2025, 4, 1).expect("date"));
        assert!(record.break_start_time.is_some());
        assert!(record.end_time.is_none());
        assert_eq!(record.next_punch(), Some(Punch::BreakEnd));
        assert!(record.worked().is_none());
    }

    #[test]
    fn worked_time_excludes_break() {
        let record = AttendanceRecord {
            id: 1,
            work_date: NaiveDate::from_ymd_opt(2025, 4, 1).expect("date"),
            start_time: at("2025-04-01", "09:00:00"),
            break_start_time: Some(at("2025-04-01", "12:00:00")),
            break_end_time: Some(at("2025-04-01", "13:00:00")),
            end_time: Some(at("2025-04-01", "18:00:00")),
            status: "FINISHED".to_string(),
        };
        assert_eq!(record.worked(), Some(TimeDelta::hours(8)));
        assert_eq!(record.next_punch(), None);
    }

    #[test]
    fn punch_segments_match_backend_routes() {
        assert_eq!(Punch::Start.path_segment(), "start");
        assert_eq!(Punch::BreakStart.path_segment(), "break-start");
        assert_eq!(Punch::BreakEnd.path_segment(), "break-end");
        assert_eq!(Punch::End.path_segment(), "end");
        assert!(Punch::Start.creates_record());
        assert!(!Punch::End.creates_record());
    }

    #[test]
    fn expense_draft_defaults_transportation_and_trims_amount() {
        let request = draft().into_request("user-42").expect("valid draft");
        assert_eq!(request.transportation_method, DEFAULT_TRANSPORTATION_METHOD);
        assert_eq!(request.amount, 580);
        assert_eq!(request.user_id, "user-42");
        let body = serde_json::to_value(&request).expect("serialize");
        assert_eq!(body["expenseDate"], "2025-04-01");
        assert_eq!(body["receiptAttached"], true);
    }

    #[test]
    fn expense_draft_rejects_missing_and_invalid_fields() {
        let missing = ExpenseDraft {
            purpose: " ".to_string(),
            ..draft()
        };
        assert_eq!(
            missing.into_request("u"),
            Err(ValidationError::MissingField { field: "purpose" })
        );

        let bad_amount = ExpenseDraft {
            amount: "-3".to_string(),
            ..draft()
        };
        assert!(matches!(
            bad_amount.into_request("u"),
            Err(ValidationError::InvalidAmount { .. })
        ));

        let bad_date = ExpenseDraft {
            expense_date: "04/01/2025".to_string(),
            ..draft()
        };
        assert!(matches!(
            bad_date.into_request("u"),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn expense_status_tolerates_unknown_values() {
        let statuses: Vec<ExpenseStatus> =
            serde_json::from_value(json!(["PENDING", "APPROVED", "ESCALATED"])).expect("statuses");
        assert_eq!(
            statuses,
            vec![
                ExpenseStatus::Pending,
                ExpenseStatus::Approved,
                ExpenseStatus::Unknown
            ]
        );
    }

    #[test]
    fn profile_patch_sets_and_clears_fields() {
        let mut profile = UserProfile::blank("user-7");
        profile.city = Some("Sapporo".to_string());
        profile.apply(UserProfilePatch {
            display_name: Some("Ren".to_string()),
            city: Some(String::new()),
            prefecture: Some("北海道".to_string()),
            ..UserProfilePatch::default()
        });
        assert_eq!(profile.display_name.as_deref(), Some("Ren"));
        assert_eq!(profile.city, None);
        assert!(profile.validate().is_ok());

        let body = serde_json::to_value(&profile).expect("serialize");
        assert_eq!(body, json!({"userId": "user-7", "displayName": "Ren", "prefecture": "北海道"}));
    }

    #[test]
    fn profile_validation_rejects_unknown_prefecture() {
        let profile = UserProfile {
            prefecture: Some("Atlantis".to_string()),
            ..UserProfile::blank("user-7")
        };
        assert!(matches!(
            profile.validate(),
            Err(ValidationError::UnknownPrefecture { .. })
        ));
    }

    #[test]
    fn memo_request_requires_title() {
        assert!(MemoRequest::new(" ", "body").is_err());
        assert_eq!(
            MemoRequest::new("Standup", "notes").expect("memo").title,
            "Standup"
        );
    }
}
