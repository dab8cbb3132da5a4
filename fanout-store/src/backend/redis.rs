use async_trait::async_trait;
use rustis::client::Client;
use rustis::commands::{
    GenericCommands, ScanOptions, SetCondition, SetExpiration, StringCommands,
};
use std::time::Duration;
use tracing::debug;

use crate::{KvStore, StoreError};

const SCAN_BATCH: usize = 200;

pub struct RedisStore {
    pub client: Client,
}

impl RedisStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn connect(uri: &str) -> Result<Self, StoreError> {
        let client = Client::connect(uri).await?;
        debug!("Connected to redis store");
        Ok(Self { client })
    }

    // Redis rejects a zero expiry, so sub-second TTLs round up.
    fn ttl_secs(ttl: Duration) -> u64 {
        ttl.as_secs().max(1)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value: Option<String> = self.client.get(key).await?;
        Ok(value)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.client
            .setex(key, Self::ttl_secs(ttl), value)
            .await?;
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let written = self
            .client
            .set_with_options(
                key,
                value,
                SetCondition::NX,
                SetExpiration::Ex(Self::ttl_secs(ttl)),
                false,
            )
            .await?;
        Ok(written)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.client.del(key).await?;
        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> Result<u64, StoreError> {
        if pattern.is_empty() {
            return Err(StoreError::Pattern("empty pattern".to_string()));
        }

        let mut cursor = 0u64;
        let mut removed = 0u64;
        loop {
            let (next, keys): (u64, Vec<String>) = self
                .client
                .scan(
                    cursor,
                    ScanOptions::default()
                        .match_pattern(pattern)
                        .count(SCAN_BATCH),
                )
                .await?;

            if !keys.is_empty() {
                let deleted: usize = self.client.del(keys).await?;
                removed += deleted as u64;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!("Deleted {} keys matching {}", removed, pattern);
        Ok(removed)
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}
