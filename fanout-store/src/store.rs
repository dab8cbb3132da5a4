//! The [`KvStore`] trait every backend implements.

use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

use crate::StoreError;

#[async_trait]
pub trait KvStore: Send + Sync {
    /// `Ok(None)` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Sets `key` only when it does not exist yet. Returns `true` if the value
    /// was written.
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Deletes every key matching a glob pattern (`*` and `?`), returning how
    /// many keys were removed.
    async fn delete_matching(&self, pattern: &str) -> Result<u64, StoreError>;
}

pub type SharedKvStore = Arc<dyn KvStore>;
