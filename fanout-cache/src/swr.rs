#![deny(clippy::unwrap_used)]
use crate::entry::{encode_payload, encode_timestamp};
use crate::{
    CacheError, CacheOptions, CachePayload, CachedEntry, StalenessWindow, keys,
};
use chrono::Utc;
use fanout_store::SharedKvStore;
use std::{future::Future, sync::Arc, time::Duration};
use tracing::{Instrument, debug, info, info_span, instrument, warn};
use uuid::Uuid;

enum Lookup<T> {
    Hit(CachedEntry<T>),
    Miss,
}

/// Stale-while-revalidate cache over a shared key-value store.
///
/// Reads never wait for a refresh: a hit is returned as is, and a hit older
/// than the window's stale-after age additionally schedules one detached
/// refresh guarded by a per-key lease.
#[derive(Clone)]
pub struct StaleWhileRevalidateCache {
    store: SharedKvStore,
    options: CacheOptions,
}

impl StaleWhileRevalidateCache {
    pub fn new(store: SharedKvStore) -> Self {
        Self::with_options(store, CacheOptions::default())
    }

    pub fn with_options(store: SharedKvStore, options: CacheOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &SharedKvStore {
        &self.store
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Serve `key` from the cache, falling back to `live_fetch` on a miss.
    ///
    /// A stale hit returns immediately and refreshes in the background. Store
    /// failures are logged and answered with an uncached live fetch.
    #[instrument(skip(self, window, live_fetch))]
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &str,
        window: StalenessWindow,
        live_fetch: F,
    ) -> T
    where
        T: CachePayload,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let live_fetch = Arc::new(live_fetch);

        match self.lookup::<T>(key).await {
            Ok(Lookup::Hit(entry)) => {
                let age = entry.age(Utc::now());
                if window.is_stale(age) {
                    debug!(?age, "Stale cache hit");
                    self.schedule_refresh(key, window, live_fetch).await;
                } else {
                    debug!(?age, "Fresh cache hit");
                }
                entry.payload
            }
            Ok(Lookup::Miss) => {
                debug!("Cache miss");
                let result = (*live_fetch)().await;
                self.store_if_cacheable(key, &result, window.ttl()).await;
                result
            }
            Err(e) => {
                warn!("Cache read failed, fetching live: {}", e);
                (*live_fetch)().await
            }
        }
    }

    /// Plain TTL caching with no staleness tracking, used by the `default`
    /// namespace.
    #[instrument(skip(self, live_fetch))]
    pub async fn fetch_plain<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        live_fetch: F,
    ) -> T
    where
        T: CachePayload,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match self.lookup::<T>(key).await {
            Ok(Lookup::Hit(entry)) => entry.payload,
            Ok(Lookup::Miss) => {
                let result = live_fetch().await;
                self.store_if_cacheable(key, &result, ttl).await;
                result
            }
            Err(e) => {
                warn!("Cache read failed, fetching live: {}", e);
                live_fetch().await
            }
        }
    }

    /// Drop the payload, timestamp and refresh lease of one key.
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key).await?;
        self.store.delete(&keys::timestamp_key(key)).await?;
        self.store.delete(&keys::lease_key(key)).await?;
        debug!(key, "Invalidated cache entry");
        Ok(())
    }

    pub async fn invalidate_matching(&self, pattern: &str) -> Result<u64, CacheError> {
        let removed = self.store.delete_matching(pattern).await?;
        debug!(pattern, removed, "Invalidated cache entries");
        Ok(removed)
    }

    async fn lookup<T: CachePayload>(
        &self,
        key: &str,
    ) -> Result<Lookup<T>, CacheError> {
        let Some(payload) = self.store.get(key).await? else {
            return Ok(Lookup::Miss);
        };
        let stored_at = self.store.get(&keys::timestamp_key(key)).await?;

        let entry = match stored_at {
            Some(stored_at) => CachedEntry::<T>::decode(&payload, &stored_at),
            None => Err(CacheError::Deserialization(
                "missing timestamp".to_string(),
            )),
        };

        match entry {
            Ok(entry) if entry.payload.is_cacheable() => Ok(Lookup::Hit(entry)),
            Ok(_) => {
                warn!(key, "Cached payload carries no data, repairing");
                self.repair(key).await;
                Ok(Lookup::Miss)
            }
            Err(e) => {
                warn!(key, "Unreadable cache entry ({}), repairing", e);
                self.repair(key).await;
                Ok(Lookup::Miss)
            }
        }
    }

    async fn repair(&self, key: &str) {
        for k in [key.to_string(), keys::timestamp_key(key)] {
            if let Err(e) = self.store.delete(&k).await {
                warn!(key = %k, "Failed to delete invalid cache entry: {}", e);
            }
        }
    }

    async fn write<T: CachePayload>(
        &self,
        key: &str,
        payload: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let encoded = encode_payload(payload)?;
        self.store.set_with_ttl(key, &encoded, ttl).await?;
        self.store
            .set_with_ttl(
                &keys::timestamp_key(key),
                &encode_timestamp(Utc::now()),
                ttl,
            )
            .await?;
        Ok(())
    }

    async fn store_if_cacheable<T: CachePayload>(
        &self,
        key: &str,
        result: &T,
        ttl: Duration,
    ) {
        if !result.is_cacheable() {
            debug!(key, "Live result not cacheable, skipping write");
            return;
        }
        if let Err(e) = self.write(key, result, ttl).await {
            warn!(key, "Cache write failed: {}", e);
        }
    }

    async fn schedule_refresh<T, F, Fut>(
        &self,
        key: &str,
        window: StalenessWindow,
        live_fetch: Arc<F>,
    ) where
        T: CachePayload,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let token = Uuid::new_v4().to_string();
        match self
            .store
            .set_if_absent(&keys::lease_key(key), &token, self.options.lease_ttl)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                debug!(key, "Refresh already in flight");
                return;
            }
            Err(e) => {
                warn!(key, "Could not acquire refresh lease: {}", e);
                return;
            }
        }

        let cache = self.clone();
        let key = key.to_string();
        let span = info_span!("cache_refresh", key = %key);
        tokio::spawn(
            async move {
                cache.refresh(&key, &token, window, live_fetch).await;
            }
            .instrument(span),
        );
    }

    async fn refresh<T, F, Fut>(
        &self,
        key: &str,
        token: &str,
        window: StalenessWindow,
        live_fetch: Arc<F>,
    ) where
        T: CachePayload,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let refresh_timeout = self.options.refresh_timeout;
        match tokio::time::timeout(refresh_timeout, (*live_fetch)()).await {
            Ok(result) if result.is_cacheable() => {
                // an invalidation in the meantime removed the lease
                if !self.holds_lease(key, token).await {
                    info!("Refresh lease lost, discarding refreshed entry");
                } else {
                    match self.write(key, &result, window.ttl()).await {
                        Ok(()) => info!("Background refresh stored fresh entry"),
                        Err(e) => warn!("Background refresh could not store entry: {}", e),
                    }
                }
            }
            Ok(_) => warn!("Background refresh returned no data, keeping existing entry"),
            Err(_) => warn!("Background refresh timed out after {:?}", refresh_timeout),
        }

        self.release_lease(key, token).await;
    }

    async fn holds_lease(&self, key: &str, token: &str) -> bool {
        match self.store.get(&keys::lease_key(key)).await {
            Ok(holder) => holder.as_deref() == Some(token),
            Err(e) => {
                warn!("Could not read refresh lease: {}", e);
                false
            }
        }
    }

    async fn release_lease(&self, key: &str, token: &str) {
        if !self.holds_lease(key, token).await {
            debug!("Refresh lease already released or taken over");
            return;
        }
        if let Err(e) = self.store.delete(&keys::lease_key(key)).await {
            warn!("Failed to release refresh lease: {}", e);
        }
    }
}

impl std::fmt::Debug for StaleWhileRevalidateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaleWhileRevalidateCache")
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use async_trait::async_trait;
    use fanout_store::{KvStore, MemoryStore, StoreError};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    const KEY: &str = "social-read:listing:twitter-like:42";

    struct FailingStore {
        writes: AtomicUsize,
    }

    #[async_trait]
    impl KvStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn set_with_ttl(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Duration,
        ) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn set_if_absent(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Duration,
        ) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn delete_matching(&self, _pattern: &str) -> Result<u64, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn counting_fetcher(
        calls: Arc<AtomicUsize>,
        response: Value,
    ) -> impl Fn() -> std::future::Ready<Value> + Clone + Send + Sync + 'static {
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(response.clone())
        }
    }

    async fn seed(store: &MemoryStore, key: &str, payload: Value, age_secs: i64) {
        let ttl = Duration::from_secs(86_400);
        store
            .set_with_ttl(key, &payload.to_string(), ttl)
            .await
            .unwrap();
        let stored_at = Utc::now() - chrono::Duration::seconds(age_secs);
        store
            .set_with_ttl(&keys::timestamp_key(key), &encode_timestamp(stored_at), ttl)
            .await
            .unwrap();
    }

    async fn read_payload(store: &MemoryStore, key: &str) -> Option<Value> {
        store
            .get(key)
            .await
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    async fn wait_for_lease_release(store: &MemoryStore, key: &str) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while store.get(&keys::lease_key(key)).await.unwrap().is_some() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("background refresh did not finish");
    }

    #[tokio::test]
    async fn test_miss_fetches_once_and_persists_pair() {
        let store = Arc::new(MemoryStore::new());
        let cache = StaleWhileRevalidateCache::new(store.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let fresh = json!({"success": true, "data": ["a", "b"]});

        let result = cache
            .fetch(
                KEY,
                StalenessWindow::social_read(),
                counting_fetcher(calls.clone(), fresh.clone()),
            )
            .await;

        assert_eq!(result, fresh);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.keys().unwrap(),
            vec![KEY.to_string(), keys::timestamp_key(KEY)]
        );
        assert_eq!(read_payload(&store, KEY).await, Some(fresh));
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_live_fetch() {
        let store = Arc::new(MemoryStore::new());
        let cache = StaleWhileRevalidateCache::new(store.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        seed(&store, KEY, json!({"success": true, "data": "cached"}), 60).await;

        let fetcher = counting_fetcher(calls.clone(), json!({"success": true, "data": "live"}));
        for _ in 0..3 {
            let result = cache
                .fetch(KEY, StalenessWindow::social_read(), fetcher.clone())
                .await;
            assert_eq!(result["data"], "cached");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(store.get(&keys::lease_key(KEY)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_hit_serves_old_and_refreshes_once() {
        let store = Arc::new(MemoryStore::new());
        let cache = StaleWhileRevalidateCache::new(store.clone());
        seed(&store, KEY, json!({"success": true, "data": "old"}), 1_000).await;

        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let fetcher = {
            let calls = calls.clone();
            let gate = gate.clone();
            move || {
                let calls = calls.clone();
                let gate = gate.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    gate.notified().await;
                    json!({"success": true, "data": "new"})
                }
            }
        };

        let window = StalenessWindow::social_read();
        let (a, b, c) = tokio::join!(
            cache.fetch(KEY, window, fetcher.clone()),
            cache.fetch(KEY, window, fetcher.clone()),
            cache.fetch(KEY, window, fetcher.clone()),
        );
        for result in [a, b, c] {
            assert_eq!(result["data"], "old");
        }

        gate.notify_one();
        wait_for_lease_release(&store, KEY).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            read_payload(&store, KEY).await,
            Some(json!({"success": true, "data": "new"}))
        );

        // the refreshed entry is fresh again
        let result = cache.fetch(KEY, window, fetcher.clone()).await;
        assert_eq!(result["data"], "new");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    fn gated_fetcher(
        calls: Arc<AtomicUsize>,
        gate: Arc<Notify>,
        response: Value,
    ) -> impl Fn() -> std::pin::Pin<Box<dyn Future<Output = Value> + Send>>
    + Clone
    + Send
    + Sync
    + 'static {
        move || -> std::pin::Pin<Box<dyn Future<Output = Value> + Send>> {
            let calls = calls.clone();
            let gate = gate.clone();
            let response = response.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                gate.notified().await;
                response
            })
        }
    }

    #[tokio::test]
    async fn test_invalidate_during_refresh_discards_result() {
        let store = Arc::new(MemoryStore::new());
        let cache = StaleWhileRevalidateCache::new(store.clone());
        seed(&store, KEY, json!({"success": true, "data": "old"}), 1_000).await;

        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let fetcher = gated_fetcher(
            calls.clone(),
            gate.clone(),
            json!({"success": true, "data": "before mutation"}),
        );

        let result = cache
            .fetch(KEY, StalenessWindow::social_read(), fetcher)
            .await;
        assert_eq!(result["data"], "old");

        cache.invalidate(KEY).await.unwrap();
        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(store.keys().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_releases_only_its_own_lease() {
        let store = Arc::new(MemoryStore::new());
        let cache = StaleWhileRevalidateCache::new(store.clone());
        seed(&store, KEY, json!({"success": true, "data": "old"}), 1_000).await;

        let gate = Arc::new(Notify::new());
        let fetcher = gated_fetcher(
            Arc::new(AtomicUsize::new(0)),
            gate.clone(),
            json!({"success": true, "data": "new"}),
        );
        cache
            .fetch(KEY, StalenessWindow::social_read(), fetcher)
            .await;

        // another refresher took the key over
        let lease = keys::lease_key(KEY);
        store
            .set_with_ttl(&lease, "other-refresh", Duration::from_secs(30))
            .await
            .unwrap();
        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(
            store.get(&lease).await.unwrap().as_deref(),
            Some("other-refresh")
        );
        assert_eq!(
            read_payload(&store, KEY).await,
            Some(json!({"success": true, "data": "old"}))
        );
    }

    struct InFlight(Arc<AtomicUsize>);

    impl Drop for InFlight {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_refreshes_never_overlap() {
        let store = Arc::new(MemoryStore::new());
        let cache = StaleWhileRevalidateCache::new(store.clone());
        seed(&store, KEY, json!({"success": true, "data": "old"}), 1_000).await;

        let calls = Arc::new(AtomicUsize::new(0));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let fetcher = {
            let calls = calls.clone();
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                let running = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(running, Ordering::SeqCst);
                let guard = InFlight(in_flight.clone());
                async move {
                    let _guard = guard;
                    tokio::time::sleep(Duration::from_secs(45)).await;
                    json!({"success": true, "data": "new"})
                }
            }
        };

        let window = StalenessWindow::social_read();
        cache.fetch(KEY, window, fetcher.clone()).await;
        tokio::time::sleep(Duration::from_secs(31)).await;
        cache.fetch(KEY, window, fetcher.clone()).await;
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
        assert!(store.get(&keys::lease_key(KEY)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_existing_entry() {
        let store = Arc::new(MemoryStore::new());
        let cache = StaleWhileRevalidateCache::new(store.clone());
        seed(&store, KEY, json!({"success": true, "data": "old"}), 1_000).await;
        let old_ts = store.get(&keys::timestamp_key(KEY)).await.unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = counting_fetcher(
            calls.clone(),
            json!({"success": false, "errorMessage": "rate limited"}),
        );

        let result = cache
            .fetch(KEY, StalenessWindow::social_read(), fetcher)
            .await;
        assert_eq!(result["data"], "old");

        wait_for_lease_release(&store, KEY).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            read_payload(&store, KEY).await,
            Some(json!({"success": true, "data": "old"}))
        );
        assert_eq!(store.get(&keys::timestamp_key(KEY)).await.unwrap(), old_ts);
    }

    #[tokio::test]
    async fn test_success_without_data_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        let cache = StaleWhileRevalidateCache::new(store.clone());
        seed(&store, KEY, json!({"success": true}), 10).await;

        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = counting_fetcher(
            calls.clone(),
            json!({"success": false, "errorMessage": "upstream down"}),
        );

        let result = cache
            .fetch(KEY, StalenessWindow::social_read(), fetcher)
            .await;

        assert_eq!(result["success"], false);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // both sub-keys were removed and the failure was not cached
        assert!(store.keys().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_entry_is_replaced_by_live_result() {
        let store = Arc::new(MemoryStore::new());
        let cache = StaleWhileRevalidateCache::new(store.clone());
        seed(&store, KEY, json!({"success": true}), 10).await;

        let calls = Arc::new(AtomicUsize::new(0));
        let fresh = json!({"success": true, "data": [1]});
        let result = cache
            .fetch(
                KEY,
                StalenessWindow::social_read(),
                counting_fetcher(calls.clone(), fresh.clone()),
            )
            .await;

        assert_eq!(result, fresh);
        assert_eq!(read_payload(&store, KEY).await, Some(fresh));
    }

    #[tokio::test]
    async fn test_missing_timestamp_is_repaired() {
        let store = Arc::new(MemoryStore::new());
        let cache = StaleWhileRevalidateCache::new(store.clone());
        store
            .set_with_ttl(
                KEY,
                r#"{"success":true,"data":1}"#,
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        cache
            .fetch(
                KEY,
                StalenessWindow::social_read(),
                counting_fetcher(calls.clone(), json!({"success": true, "data": 2})),
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.keys().unwrap(),
            vec![KEY.to_string(), keys::timestamp_key(KEY)]
        );
    }

    #[tokio::test]
    async fn test_store_failure_falls_through_to_live_fetch() {
        let store = Arc::new(FailingStore {
            writes: AtomicUsize::new(0),
        });
        let cache = StaleWhileRevalidateCache::new(store.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = counting_fetcher(calls.clone(), json!({"success": true, "data": "live"}));

        for _ in 0..2 {
            let result = cache
                .fetch(KEY, StalenessWindow::social_read(), fetcher.clone())
                .await;
            assert_eq!(result["data"], "live");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_live_result_is_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let cache = StaleWhileRevalidateCache::new(store.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = counting_fetcher(
            calls.clone(),
            json!({"success": false, "errorMessage": "nope"}),
        );

        cache
            .fetch(KEY, StalenessWindow::social_read(), fetcher.clone())
            .await;
        cache
            .fetch(KEY, StalenessWindow::social_read(), fetcher)
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(store.keys().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_plain_fetch_caches_until_ttl() {
        let store = Arc::new(MemoryStore::new());
        let cache = StaleWhileRevalidateCache::new(store.clone());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = keys::default_key("website:posts");
        let fetcher = counting_fetcher(calls.clone(), json!({"success": true, "data": []}));

        cache
            .fetch_plain(&key, crate::DEFAULT_TTL, fetcher.clone())
            .await;
        cache
            .fetch_plain(&key, crate::DEFAULT_TTL, fetcher.clone())
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(301)).await;
        cache
            .fetch_plain(&key, crate::DEFAULT_TTL, fetcher.clone())
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let store = Arc::new(MemoryStore::new());
        let cache = StaleWhileRevalidateCache::new(store.clone());
        seed(&store, KEY, json!({"success": true, "data": 1}), 10).await;
        seed(&store, "social-read:user", json!({"success": true, "data": 1}), 10).await;
        seed(&store, "default:website:posts", json!({"success": true, "data": 1}), 10).await;

        cache.invalidate(KEY).await.unwrap();
        assert!(store.get(KEY).await.unwrap().is_none());
        assert!(store.get(&keys::timestamp_key(KEY)).await.unwrap().is_none());

        let removed = cache
            .invalidate_matching(keys::SOCIAL_READ_PATTERN)
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(
            store.keys().unwrap(),
            vec![
                "default:website:posts".to_string(),
                "default:website:posts:ts".to_string()
            ]
        );
    }
}
