//! Key-value store abstraction shared by the fanout cache and adapters.
//!
//! Every operation is fallible and reports a [`StoreError`] that is distinct
//! from "key absent": callers fall through to a live fetch on a store error,
//! while `Ok(None)` is a legitimate miss.
//!
//! Backends:
//! - [`MemoryStore`] (always available)
//! - [`RedisStore`] (with the "redis" feature)

pub mod backend;
pub mod pattern;
pub mod store;

pub use crate::backend::MemoryStore;
#[cfg(feature = "redis")]
pub use crate::backend::RedisStore;
pub use crate::store::{KvStore, SharedKvStore};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid key pattern: {0}")]
    Pattern(String),
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] rustis::Error),
}
