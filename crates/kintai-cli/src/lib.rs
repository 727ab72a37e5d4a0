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
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Command-line client for Kintai: one subcommand per page.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `page.rs`: page activation through the session resolver and access gate
//! - `commands/`: command handlers grouped by page
//! - `client.rs`: shared context, error types, and error classification
//! - `output.rs`: renderers and formatting helpers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;
pub(crate) mod page;

pub use cli::run;
