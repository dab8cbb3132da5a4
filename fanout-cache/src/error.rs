use fanout_store::StoreError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("stale-after {stale_after:?} must be shorter than ttl {ttl:?}")]
    InvalidWindow {
        ttl: Duration,
        stale_after: Duration,
    },

    #[error("refresh timeout {refresh_timeout:?} must be shorter than lease ttl {lease_ttl:?}")]
    InvalidLease {
        lease_ttl: Duration,
        refresh_timeout: Duration,
    },
}
