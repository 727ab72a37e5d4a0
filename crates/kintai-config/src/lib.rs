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

//! Client configuration for Kintai surfaces.
//!
//! Layout: `model.rs` (typed config + file overlay), `defaults.rs` (built-in
//! values), `loader.rs` (file and environment layering), `validate.rs`
//! (field checks), `error.rs` (error taxonomy).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{CONFIG_PATH_ENV, ConfigLoader};
pub use model::{
    BackendConfig, ClientConfig, ConfigFile, HttpConfig, IdentityConfig, LoggingSettings,
    SessionSettings,
};
