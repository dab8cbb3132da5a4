//! In-memory implementation of the KvStore trait. Entries carry a deadline and
//! are evicted lazily: on read, on conditional writes and during pattern
//! deletes.
use crate::pattern::KeyPattern;
use crate::{KvStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Instant,
}

impl StoredValue {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys that have not expired yet, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let now = Instant::now();
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, stored)| !stored.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match entries.get(key) {
            Some(stored) if stored.is_expired(Instant::now()) => {
                entries.remove(key);
                Ok(None)
            }
            Some(stored) => Ok(Some(stored.value.clone())),
            None => Ok(None),
        }
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        entries.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let now = Instant::now();

        if let Some(stored) = entries.get(key) {
            if !stored.is_expired(now) {
                return Ok(false);
            }
        }

        entries.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> Result<u64, StoreError> {
        let pattern = KeyPattern::new(pattern)?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let now = Instant::now();

        let mut removed = 0;
        entries.retain(|key, stored| {
            if stored.is_expired(now) {
                return false;
            }
            if pattern.matches(key) {
                removed += 1;
                return false;
            }
            true
        });
        Ok(removed)
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size = self.entries.lock().map(|e| e.len()).unwrap_or_default();
        f.debug_struct("MemoryStore").field("size", &size).finish()
    }
}
