//! Credential stores.
//!
//! At most one credential is current. Setting a new one silently replaces
//! the prior value; clearing an absent credential is not an error.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use idv_types::{Credential, AUTH_TOKEN_KEY};
use serde_json::{Map, Value};

use crate::error::SessionError;

/// Holder of the process-wide bearer credential.
pub trait CredentialStore: Send + Sync {
    /// The current credential, if any.
    fn get(&self) -> Option<Credential>;

    /// Replace the current credential.
    fn set(&self, credential: Credential) -> Result<(), SessionError>;

    /// Remove the current credential.
    fn clear(&self) -> Result<(), SessionError>;
}

/// In-memory store. Share it behind an `Arc` to make it process-wide.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    current: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out holding `credential`.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            current: RwLock::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Credential> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, credential: Credential) -> Result<(), SessionError> {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credential);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

/// Store persisted as a JSON object on disk, with the token under
/// [`AUTH_TOKEN_KEY`]. Other keys in the file are preserved.
///
/// A missing file means no credential. Read failures are logged and treated
/// as absent so they never block a request; a corrupt file is copied to
/// `<path>.corrupt` before a write replaces it.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: RwLock<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, SessionError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(SessionError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(SessionError::Corrupt {
                path: self.path.clone(),
                detail: format!("found {other}"),
            }),
            Err(e) => Err(SessionError::Corrupt {
                path: self.path.clone(),
                detail: e.to_string(),
            }),
        }
    }

    /// Load the map for a read-modify-write cycle.
    ///
    /// An unreadable file is logged and replaced by an empty map; a corrupt
    /// one is first copied aside to [`FileCredentialStore::backup_path`].
    fn load_for_update(&self) -> Map<String, Value> {
        match self.load() {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("replacing unreadable credential store: {e}");
                if matches!(e, SessionError::Corrupt { .. }) {
                    let backup = self.backup_path();
                    match fs::copy(&self.path, &backup) {
                        Ok(_) => tracing::warn!(
                            "kept corrupt credential store as {}",
                            backup.display()
                        ),
                        Err(e) => tracing::warn!(
                            "could not keep corrupt credential store as {}: {e}",
                            backup.display()
                        ),
                    }
                }
                Map::new()
            }
        }
    }

    /// Where a corrupt credential file is kept before it is replaced.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".corrupt");
        PathBuf::from(name)
    }

    fn save(&self, map: &Map<String, Value>) -> Result<(), SessionError> {
        let write_err = |source| SessionError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let contents = serde_json::to_string_pretty(map).map_err(|e| SessionError::Corrupt {
            path: self.path.clone(),
            detail: e.to_string(),
        })?;
        fs::write(&self.path, contents).map_err(write_err)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<Credential> {
        let _guard = self.lock.read().unwrap_or_else(|p| p.into_inner());
        match self.load() {
            Ok(map) => map
                .get(AUTH_TOKEN_KEY)
                .and_then(Value::as_str)
                .map(Credential::new),
            Err(e) => {
                tracing::warn!("ignoring unreadable credential store: {e}");
                None
            }
        }
    }

    fn set(&self, credential: Credential) -> Result<(), SessionError> {
        let _guard = self.lock.write().unwrap_or_else(|p| p.into_inner());
        let mut map = self.load_for_update();
        map.insert(
            AUTH_TOKEN_KEY.to_string(),
            Value::String(credential.as_str().to_string()),
        );
        self.save(&map)
    }

    fn clear(&self) -> Result<(), SessionError> {
        let _guard = self.lock.write().unwrap_or_else(|p| p.into_inner());
        let mut map = self.load_for_update();
        if map.remove(AUTH_TOKEN_KEY).is_none() {
            return Ok(());
        }
        self.save(&map)
    }
}
