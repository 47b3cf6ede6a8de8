//! Token Store
//! Mission: Single source of truth for whether admin credentials are held

use crate::auth::codec::TokenCodec;
use crate::auth::models::CredentialPair;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Fixed storage keys for the obfuscated record
pub const ACCESS_TOKEN_KEY: &str = "rewear.admin.access";
pub const REFRESH_TOKEN_KEY: &str = "rewear.admin.refresh";

/// String-to-string persistence seam behind the token store.
///
/// Implementations must survive whatever lifetime the deployment needs
/// (SQLite for real profiles, memory for tests); the store itself never
/// sees raw token bytes hit the medium un-encoded.
pub trait StorageMedium: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// SQLite-backed medium: one `kv` table in the profile directory
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    pub fn new(db_path: &Path) -> Result<Self> {
        let storage = Self {
            db_path: db_path.to_path_buf(),
        };
        storage.init_db()?;
        Ok(storage)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path).context("Failed to open token store database")
    }
}

impl StorageMedium for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.open()?;
        let result = conn.query_row(
            "SELECT value FROM kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .context("Failed to write token record")?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
            .context("Failed to delete token record")?;
        Ok(())
    }
}

/// In-memory medium for tests and embedding without a profile directory
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageMedium for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Persists the credential pair through the codec and answers the
/// authentication predicate.
pub struct TokenStore {
    storage: Box<dyn StorageMedium>,
    codec: TokenCodec,
}

impl TokenStore {
    pub fn new(storage: Box<dyn StorageMedium>, codec: TokenCodec) -> Self {
        Self { storage, codec }
    }

    /// Writes both tokens, access first. The first failing write aborts the
    /// sequence and surfaces the error; no rollback is attempted.
    pub fn set_tokens(&self, pair: &CredentialPair) -> Result<()> {
        self.storage
            .set(ACCESS_TOKEN_KEY, &self.codec.encode(&pair.access_token))
            .context("Failed to persist access token")?;
        self.storage
            .set(REFRESH_TOKEN_KEY, &self.codec.encode(&pair.refresh_token))
            .context("Failed to persist refresh token")?;
        Ok(())
    }

    pub fn get_access_token(&self) -> Option<String> {
        self.read_token(ACCESS_TOKEN_KEY)
    }

    /// Stored for contract parity with the backend; no renewal flow
    /// consumes it yet.
    pub fn get_refresh_token(&self) -> Option<String> {
        self.read_token(REFRESH_TOKEN_KEY)
    }

    /// Removes both keys unconditionally; safe to call when already cleared.
    pub fn clear_tokens(&self) -> Result<()> {
        self.storage
            .remove(ACCESS_TOKEN_KEY)
            .context("Failed to clear access token")?;
        self.storage
            .remove(REFRESH_TOKEN_KEY)
            .context("Failed to clear refresh token")?;
        Ok(())
    }

    /// Presence check on the access token only. Says nothing about
    /// server-side validity or expiry.
    pub fn is_authenticated(&self) -> bool {
        self.get_access_token().is_some()
    }

    /// Reads and decodes one key. A value that no longer decodes is purged
    /// and reads as absent, so one corrupt record cannot wedge the client.
    fn read_token(&self, key: &str) -> Option<String> {
        let stored = match self.storage.get(key) {
            Ok(value) => value?,
            Err(e) => {
                warn!("Token storage read failed for {}: {:#}", key, e);
                return None;
            }
        };
        match self.codec.decode(&stored) {
            Ok(plain) => Some(plain),
            Err(e) => {
                warn!("🗑️  Purging corrupt token record {}: {}", key, e);
                if let Err(e) = self.storage.remove(key) {
                    warn!("Failed to purge corrupt record {}: {:#}", key, e);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_pair() -> CredentialPair {
        CredentialPair {
            access_token: "access-abc123".to_string(),
            refresh_token: "refresh-xyz789".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: Some(3600),
        }
    }

    fn create_test_store() -> (TokenStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("tokens.db");
        let storage = SqliteStorage::new(&db_path).unwrap();
        let codec = TokenCodec::new("test-key").unwrap();
        (TokenStore::new(Box::new(storage), codec), temp_dir)
    }

    #[test]
    fn test_set_and_get_consistency() {
        let (store, _temp) = create_test_store();

        assert!(!store.is_authenticated());
        store.set_tokens(&test_pair()).unwrap();

        assert_eq!(store.get_access_token().as_deref(), Some("access-abc123"));
        assert_eq!(store.get_refresh_token().as_deref(), Some("refresh-xyz789"));
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (store, _temp) = create_test_store();
        store.set_tokens(&test_pair()).unwrap();

        store.clear_tokens().unwrap();
        assert!(!store.is_authenticated());

        // Clearing again must be a no-op, not an error
        store.clear_tokens().unwrap();
        assert!(!store.is_authenticated());
        assert_eq!(store.get_refresh_token(), None);
    }

    #[test]
    fn test_tokens_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("tokens.db");
        let codec = TokenCodec::new("test-key").unwrap();

        let store = TokenStore::new(
            Box::new(SqliteStorage::new(&db_path).unwrap()),
            codec.clone(),
        );
        store.set_tokens(&test_pair()).unwrap();
        drop(store);

        let reopened = TokenStore::new(Box::new(SqliteStorage::new(&db_path).unwrap()), codec);
        assert_eq!(
            reopened.get_access_token().as_deref(),
            Some("access-abc123")
        );
    }

    #[test]
    fn test_stored_values_are_not_plaintext() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("tokens.db");
        let storage = SqliteStorage::new(&db_path).unwrap();
        let codec = TokenCodec::new("test-key").unwrap();
        let store = TokenStore::new(Box::new(SqliteStorage::new(&db_path).unwrap()), codec);

        store.set_tokens(&test_pair()).unwrap();

        let raw = storage.get(ACCESS_TOKEN_KEY).unwrap().unwrap();
        assert_ne!(raw, "access-abc123");
    }

    #[test]
    fn test_corruption_self_healing() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("tokens.db");
        let codec = TokenCodec::new("test-key").unwrap();
        let store = TokenStore::new(Box::new(SqliteStorage::new(&db_path).unwrap()), codec);
        store.set_tokens(&test_pair()).unwrap();

        // Poison the access record through a side channel
        let side = SqliteStorage::new(&db_path).unwrap();
        side.set(ACCESS_TOKEN_KEY, "@@not-base64@@").unwrap();

        assert_eq!(store.get_access_token(), None);
        // The corrupt key was purged, not left to fail forever
        assert_eq!(side.get(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_partial_record_reads_unauthenticated() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("tokens.db");
        let codec = TokenCodec::new("test-key").unwrap();
        let store = TokenStore::new(Box::new(SqliteStorage::new(&db_path).unwrap()), codec);
        store.set_tokens(&test_pair()).unwrap();

        let side = SqliteStorage::new(&db_path).unwrap();
        side.remove(ACCESS_TOKEN_KEY).unwrap();

        // Refresh token alone does not count as a session
        assert!(!store.is_authenticated());
        assert_eq!(store.get_refresh_token().as_deref(), Some("refresh-xyz789"));
    }

    #[test]
    fn test_memory_storage_backend() {
        let codec = TokenCodec::new("test-key").unwrap();
        let store = TokenStore::new(Box::new(MemoryStorage::new()), codec);

        store.set_tokens(&test_pair()).unwrap();
        assert!(store.is_authenticated());
        store.clear_tokens().unwrap();
        assert!(!store.is_authenticated());
    }
}
