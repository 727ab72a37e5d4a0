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
#![allow(clippy::module_name_repetitions)]

//! Session resolution and authorization gating shared by every Kintai page.
//!
//! Layout: `credential.rs` (credential + identity handles), `profile.rs`
//! (authorization profile parsing), `store.rs` (credential storage seam),
//! `provider.rs` (identity/profile collaborator traits), `resolver.rs`
//! (the resolution workflow), `gate.rs` (pending/granted/denied indicator),
//! `error.rs` (failure taxonomy).

pub mod credential;
pub mod error;
pub mod gate;
pub mod profile;
pub mod provider;
pub mod resolver;
pub mod store;

pub use credential::{Credential, Identity};
pub use error::{SessionError, StoreError, StoreResult};
pub use gate::{AccessGate, AccessState, Requirement};
pub use profile::{AuthorizationProfile, DEFAULT_PRIVILEGE_FIELD};
pub use provider::{IdentityProvider, ProfileDirectory};
pub use resolver::{
    DEFAULT_LOGIN_ROUTE, FailureDisposition, FailurePolicy, Resolution, ResolverOptions,
    SessionContext, SessionOutcome, SessionResolver,
};
pub use store::{
    CREDENTIAL_KEY, CredentialSlot, CredentialStore, FileCredentialStore, MemoryCredentialStore,
};
