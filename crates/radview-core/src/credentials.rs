//! Persisted credential slot.
//!
//! # Design
//! - One token, stored under one fixed key; nothing else about the session
//!   survives a restart.
//! - Writes happen synchronously so the stored value always matches the last
//!   completed state transition.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};

/// Key under which the token is stored.
pub const CREDENTIAL_KEY: &str = "radview.jwt_token";

/// Storage for the single persisted bearer token.
pub trait CredentialStore {
    /// Read the stored token, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage exists but cannot be read.
    fn load(&self) -> io::Result<Option<String>>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be written.
    fn save(&self, token: &str) -> io::Result<()>;

    /// Remove the stored token. Removing an absent token succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing storage cannot be updated.
    fn clear(&self) -> io::Result<()>;
}

/// JSON key/value file holding the token under [`CREDENTIAL_KEY`].
///
/// Other keys found in the file are preserved.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store backed by the file at `path`; the file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> io::Result<Map<String, Value>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err),
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        serde_json::from_slice(&raw).map_err(|err| io::Error::new(ErrorKind::InvalidData, err))
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(entries)
            .map_err(|err| io::Error::new(ErrorKind::InvalidData, err))?;
        let staging = self.path.with_extension("tmp");
        let mut file = staging_options().open(&staging)?;
        #[cfg(unix)]
        file.set_permissions(fs::Permissions::from_mode(CREDENTIAL_FILE_MODE))?;
        file.write_all(&body)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&staging, &self.path)
    }
}

/// Owner read/write only; the file holds a bearer token.
#[cfg(unix)]
const CREDENTIAL_FILE_MODE: u32 = 0o600;

fn staging_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(CREDENTIAL_FILE_MODE);
    options
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> io::Result<Option<String>> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(CREDENTIAL_KEY)
            .and_then(Value::as_str)
            .filter(|token| !token.trim().is_empty())
            .map(str::to_string))
    }

    fn save(&self, token: &str) -> io::Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(CREDENTIAL_KEY.to_string(), Value::String(token.to_string()));
        self.write_entries(&entries)
    }

    fn clear(&self) -> io::Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(CREDENTIAL_KEY).is_none() {
            return Ok(());
        }
        if entries.is_empty() {
            match fs::remove_file(&self.path) {
                Err(err) if err.kind() != ErrorKind::NotFound => Err(err),
                _ => Ok(()),
            }
        } else {
            self.write_entries(&entries)
        }
    }
}

/// In-memory store; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryCredentialStore {
    /// Store pre-populated with `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.into()))),
        }
    }

    /// Current slot contents.
    #[must_use]
    pub fn stored(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.stored())
    }

    fn save(&self, token: &str) -> io::Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_token() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FileCredentialStore::new(dir.path().join("nested").join("creds.json"));
        assert_eq!(store.load()?, None);

        store.save("tok-1")?;
        assert_eq!(store.load()?, Some("tok-1".to_string()));

        store.save("tok-2")?;
        assert_eq!(store.load()?, Some("tok-2".to_string()));

        store.clear()?;
        assert_eq!(store.load()?, None);
        assert!(!store.path().exists());
        store.clear()?;
        Ok(())
    }

    #[test]
    fn file_store_keeps_foreign_keys() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("creds.json");
        fs::write(&path, r#"{"radview.theme":"dark"}"#)?;
        let store = FileCredentialStore::new(&path);

        store.save("tok")?;
        store.clear()?;

        let remaining = fs::read_to_string(&path)?;
        assert!(remaining.contains("radview.theme"));
        assert!(!remaining.contains(CREDENTIAL_KEY));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn file_store_restricts_permissions_to_owner() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("creds.json");
        fs::write(path.with_extension("tmp"), "stale")?;
        fs::set_permissions(path.with_extension("tmp"), fs::Permissions::from_mode(0o644))?;
        let store = FileCredentialStore::new(&path);

        store.save("secret-jwt")?;
        assert_eq!(fs::metadata(&path)?.permissions().mode() & 0o777, 0o600);

        store.save("secret-jwt-2")?;
        assert_eq!(fs::metadata(&path)?.permissions().mode() & 0o777, 0o600);
        assert_eq!(store.load()?, Some("secret-jwt-2".to_string()));
        Ok(())
    }

    #[test]
    fn file_store_rejects_corrupt_file() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("creds.json");
        fs::write(&path, "not json")?;
        let err = FileCredentialStore::new(&path)
            .load()
            .expect_err("corrupt file fails");
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        Ok(())
    }

    #[test]
    fn blank_token_reads_as_absent() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("creds.json");
        fs::write(&path, format!(r#"{{"{CREDENTIAL_KEY}":"  "}}"#))?;
        assert_eq!(FileCredentialStore::new(&path).load()?, None);
        Ok(())
    }

    #[test]
    fn memory_store_clones_share_slot() -> io::Result<()> {
        let store = MemoryCredentialStore::default();
        let observer = store.clone();
        store.save("abc")?;
        assert_eq!(observer.stored(), Some("abc".to_string()));
        store.clear()?;
        assert_eq!(observer.load()?, None);
        Ok(())
    }
}
