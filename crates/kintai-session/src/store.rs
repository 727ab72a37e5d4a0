//! Local persistent storage for the session credential.
//!
//! # Design
//! - Storage is a plain string key-value seam so tests can swap it out.
//! - `CredentialSlot` binds a store to the fixed credential key; nothing else
//!   in the workspace touches the key directly.
//! - The file store rewrites the whole map through a temp file and rename.
//! - An unreadable file blocks reads but never writes: `set` replaces it and
//!   `remove` deletes it, so login and logout recover the store.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::credential::Credential;
use crate::error::{StoreError, StoreResult};

/// Storage key under which the access token is kept.
pub const CREDENTIAL_KEY: &str = "access_token";

/// Minimal key-value contract for client-side persistent storage.
pub trait CredentialStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be read.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be written.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// In-process store, used by embedders and tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a single entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(key.to_string(), value.to_string());
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// JSON-file-backed store holding a flat string map.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Bind the store to `path`. The file is created lazily on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<BTreeMap<String, String>> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let bytes = serde_json::to_vec_pretty(entries).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, bytes).map_err(io_err)?;
        restrict_permissions(&staging).map_err(io_err)?;
        fs::rename(&staging, &self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), "credential store written");
        Ok(())
    }

    fn delete_file(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(StoreError::Corrupt { source, .. }) => {
                warn!(
                    path = %self.path.display(),
                    error = %source,
                    "credential store unreadable; replacing it"
                );
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        match self.load() {
            Ok(mut entries) => {
                if entries.remove(key).is_some() {
                    self.save(&entries)?;
                }
                Ok(())
            }
            Err(StoreError::Corrupt { source, .. }) => {
                warn!(
                    path = %self.path.display(),
                    error = %source,
                    "credential store unreadable; deleting it"
                );
                self.delete_file()
            }
            Err(err) => Err(err),
        }
    }
}

/// A store bound to the credential key.
#[derive(Clone)]
pub struct CredentialSlot {
    store: Arc<dyn CredentialStore>,
    key: String,
}

impl CredentialSlot {
    /// Bind `store` to `key`.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Bind `store` to [`CREDENTIAL_KEY`].
    #[must_use]
    pub fn with_default_key(store: Arc<dyn CredentialStore>) -> Self {
        Self::new(store, CREDENTIAL_KEY)
    }

    /// Read the stored credential; blank values read as absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying store cannot be read.
    pub fn load(&self) -> StoreResult<Option<Credential>> {
        Ok(self.store.get(&self.key)?.and_then(Credential::new))
    }

    /// Persist a freshly issued credential.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying store cannot be written.
    pub fn persist(&self, credential: &Credential) -> StoreResult<()> {
        self.store.set(&self.key, credential.expose())
    }

    /// Remove the credential (logout or rejected token).
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying store cannot be written.
    pub fn discard(&self) -> StoreResult<()> {
        self.store.remove(&self.key)
    }
}
