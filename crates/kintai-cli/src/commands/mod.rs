//! Command handlers grouped by page.

pub(crate) mod account;
pub(crate) mod admin;
pub(crate) mod attendance;
pub(crate) mod expense;
pub(crate) mod memo;
pub(crate) mod profile;
