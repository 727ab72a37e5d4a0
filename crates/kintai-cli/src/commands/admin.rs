//! Administrator page.
//!
//! # Design
//! - Requires the privileged gate to settle `Granted`.
//! - A denied caller still sees the profile record that was retrieved, so a
//!   missing or non-boolean privilege field can be diagnosed.

use kintai_session::Requirement;
use serde_json::Map;

use crate::cli::OutputFormat;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_profile_record, render_session};
use crate::page::{PageAccess, activate};

pub(crate) async fn handle_admin(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    match activate(ctx, Requirement::Privileged).await? {
        PageAccess::Granted(session) => {
            if format == OutputFormat::Table {
                println!("administrator page");
            }
            render_session(&session, format)
        }
        PageAccess::Denied(session) => {
            let empty = Map::new();
            let record = session
                .profile()
                .map_or(&empty, |profile| profile.record());
            render_profile_record(record)?;
            Err(CliError::Denied)
        }
    }
}
