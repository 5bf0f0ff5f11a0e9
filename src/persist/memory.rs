//! Volatile blob store for tests and previews.

use std::sync::{Arc, Mutex};

use hashbrown::HashMap;

use super::{KvStore, PersistError, PersistResult};

/// In-memory [`KvStore`]. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| PersistError::Message("memory store poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> PersistResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| PersistError::Message("memory store poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> PersistResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| PersistError::Message("memory store poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}
