//! Stale-while-revalidate cache for fanout.
//!
//! Upstream publishing platforms impose severe read limits, so listings are
//! served from the shared [`KvStore`](fanout_store::KvStore) and refreshed in
//! the background once they pass their stale-after age. The cache is an
//! optimization: store failures fall through to a live fetch and are never
//! surfaced to the caller.

mod entry;
mod error;
pub mod keys;
mod policy;
mod swr;

pub use entry::{CachePayload, CachedEntry};
pub use error::CacheError;
pub use policy::{
    CacheOptions, CacheOptionsBuilder, CacheOptionsBuilderError, DEFAULT_TTL,
    StalenessWindow,
};
pub use swr::StaleWhileRevalidateCache;
