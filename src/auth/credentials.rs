//! Persisted credential record and its storage backends.
//!
//! The client persists exactly three values between loads: the access
//! token, the refresh token, and the serialized user identity. They are
//! written together and cleared together; a record missing any of the
//! three is treated as corrupt and discarded at the next read.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::warn;

use crate::models::UserIdentity;

/// Storage key for the access token
pub const KEY_ACCESS_TOKEN: &str = "accessToken";
/// Storage key for the refresh token
pub const KEY_REFRESH_TOKEN: &str = "refreshToken";
/// Storage key for the serialized user identity
pub const KEY_USER: &str = "user";

/// File name for the file-backed store
const CREDENTIALS_FILE: &str = "credentials.json";

/// Keychain service name for the keyring-backed store
const SERVICE_NAME: &str = "comicreader";

/// The persisted credential triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserIdentity,
}

/// Flat key/value persistence. Implementations only move strings; all
/// record-level semantics live in [`CredentialStore`].
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// JSON file under the app data directory. One map, rewritten per change.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            path: dir.join(CREDENTIALS_FILE),
        }
    }

    fn read_map(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read credentials file")?;
        serde_json::from_str(&contents).context("Failed to parse credentials file")
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map().unwrap_or_default();
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut map = match self.read_map() {
            Ok(map) => map,
            // An unreadable file cannot be edited key by key; drop it whole
            Err(_) => {
                if self.path.exists() {
                    std::fs::remove_file(&self.path)
                        .context("Failed to remove corrupt credentials file")?;
                }
                return Ok(());
            }
        };
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// OS keychain via `keyring`. One entry per storage key.
pub struct KeyringStorage;

impl KeyringStorage {
    fn entry(key: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, key).context("Failed to create keyring entry")
    }
}

impl Storage for KeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match Self::entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read from keychain"),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        Self::entry(key)?
            .set_password(value)
            .context("Failed to write to keychain")
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match Self::entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete from keychain"),
        }
    }
}

/// In-memory backend for tests and ephemeral (incognito-style) sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    map: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.map.remove(key);
        Ok(())
    }
}

/// Wrapper owning a storage backend and enforcing the all-or-nothing
/// shape of the credential record.
pub struct CredentialStore {
    storage: Box<dyn Storage + Send>,
}

impl CredentialStore {
    pub fn new(storage: Box<dyn Storage + Send>) -> Self {
        Self { storage }
    }

    /// File-backed store under the given data directory.
    pub fn file_backed(dir: PathBuf) -> Self {
        Self::new(Box::new(FileStorage::new(dir)))
    }

    /// Keychain-backed store.
    pub fn keyring_backed() -> Self {
        Self::new(Box::new(KeyringStorage))
    }

    /// In-memory store.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    /// Write all three fields of the record.
    pub fn write(&mut self, record: &CredentialRecord) -> Result<()> {
        let user_json = serde_json::to_string(&record.user)?;
        self.storage.set(KEY_ACCESS_TOKEN, &record.access_token)?;
        self.storage.set(KEY_REFRESH_TOKEN, &record.refresh_token)?;
        self.storage.set(KEY_USER, &user_json)?;
        Ok(())
    }

    /// Remove all three fields. Safe to call when nothing is stored.
    pub fn clear(&mut self) -> Result<()> {
        self.storage.remove(KEY_ACCESS_TOKEN)?;
        self.storage.remove(KEY_REFRESH_TOKEN)?;
        self.storage.remove(KEY_USER)?;
        Ok(())
    }

    /// Read the record. A partial, unparseable, or unreadable record is
    /// purged and reported as absent; this never errors outward.
    pub fn load(&mut self) -> Option<CredentialRecord> {
        let access_token = self.storage.get(KEY_ACCESS_TOKEN);
        let refresh_token = self.storage.get(KEY_REFRESH_TOKEN);
        let user_json = self.storage.get(KEY_USER);

        let (access_token, refresh_token, user_json) =
            match (access_token, refresh_token, user_json) {
                (Ok(a), Ok(r), Ok(u)) => (a, r, u),
                (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                    warn!(error = %e, "Credential storage unreadable, purging record");
                    self.purge();
                    return None;
                }
            };

        match (access_token, refresh_token, user_json) {
            (None, None, None) => None,
            (Some(access_token), Some(refresh_token), Some(user_json)) => {
                match serde_json::from_str::<UserIdentity>(&user_json) {
                    Ok(user) => Some(CredentialRecord {
                        access_token,
                        refresh_token,
                        user,
                    }),
                    Err(e) => {
                        warn!(error = %e, "Stored user identity is unparseable, purging record");
                        self.purge();
                        None
                    }
                }
            }
            _ => {
                warn!("Partial credential record found, purging");
                self.purge();
                None
            }
        }
    }

    /// Current access token, without record-shape validation.
    /// Used by the session guard's focus checks.
    pub fn access_token(&self) -> Option<String> {
        self.storage.get(KEY_ACCESS_TOKEN).ok().flatten()
    }

    fn purge(&mut self) {
        if let Err(e) = self.clear() {
            warn!(error = %e, "Failed to purge corrupt credential record");
        }
    }
}
