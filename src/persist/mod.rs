pub mod memory;
pub mod sqlite;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Key holding the report ledger snapshot.
pub const LEDGER_KEY: &str = "update-store";
/// Key holding the favorite place ids.
pub const FAVORITES_KEY: &str = "favorites-storage";
/// Key holding the local user profile.
pub const PROFILE_KEY: &str = "user-storage";

/// Version number for serialized [`Envelope`] payloads.
pub const BLOB_FORMAT_VERSION: u16 = 1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unsupported format version {found} under key {key}")]
    UnsupportedFormat { key: String, found: u16 },
    #[error("ledger restore failed: {0}")]
    Ledger(#[from] crate::core::ledger::LedgerError),
    #[error("{0}")]
    Message(String),
}

pub type PersistResult<T> = Result<T, PersistError>;

/// Opaque blob store addressed by fixed key names.
pub trait KvStore: Send {
    fn get(&self, key: &str) -> PersistResult<Option<Vec<u8>>>;
    fn put(&mut self, key: &str, value: &[u8]) -> PersistResult<()>;
    fn remove(&mut self, _key: &str) -> PersistResult<()> {
        Ok(())
    }
    fn flush(&mut self) -> PersistResult<()> {
        Ok(())
    }
}

/// Versioned wrapper for stable blob decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub format_version: u16,
    pub state: T,
}

/// Serializes `state` inside an [`Envelope`] and stores it under `key`.
pub fn save_json<T: Serialize>(kv: &mut dyn KvStore, key: &str, state: &T) -> PersistResult<()> {
    let env = Envelope {
        format_version: BLOB_FORMAT_VERSION,
        state,
    };
    let payload = serde_json::to_vec(&env)?;
    kv.put(key, &payload)
}

/// Loads the value under `key`; `Ok(None)` when the key was never written.
pub fn load_json<T: DeserializeOwned>(kv: &dyn KvStore, key: &str) -> PersistResult<Option<T>> {
    let Some(payload) = kv.get(key)? else {
        return Ok(None);
    };

    let env: Envelope<T> = serde_json::from_slice(&payload)?;
    if env.format_version != BLOB_FORMAT_VERSION {
        return Err(PersistError::UnsupportedFormat {
            key: key.to_string(),
            found: env.format_version,
        });
    }
    Ok(Some(env.state))
}
