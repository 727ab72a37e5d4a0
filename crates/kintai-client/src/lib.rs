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

//! HTTP clients for the Cognito user pool and the Kintai backend.
//!
//! Layout: `http.rs` (shared reqwest client construction), `identity.rs`
//! (user-pool JSON operations and the [`IdentityProvider`] implementation),
//! `backend.rs` (REST resources and the [`ProfileDirectory`] implementation),
//! `error.rs` (error taxonomy).
//!
//! [`IdentityProvider`]: kintai_session::IdentityProvider
//! [`ProfileDirectory`]: kintai_session::ProfileDirectory

pub mod backend;
pub mod error;
pub mod http;
pub mod identity;

pub use backend::BackendClient;
pub use error::{ClientError, ClientResult};
pub use http::{HEADER_REQUEST_ID, build_http_client};
pub use identity::{CognitoClient, SignUpOutcome};
