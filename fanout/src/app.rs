//! Application bootstrap: builds the store, cache, adapters and orchestrator
//! from [`Settings`] and wires them together.
use anyhow::Context;
use fanout_cache::{CacheOptions, StaleWhileRevalidateCache, StalenessWindow, keys};
use fanout_config::{
    FanoutConfig, HttpClientParams, Settings, StoreBackend, StoreSettings,
    build_http_client,
};
use fanout_platforms::{
    FacebookAdapter, GraphTokenRefresher, HmacSha1Signer, InMemoryPostRepository,
    OAuth1Credentials, PostRepository, TwitterAdapter, WebsiteAdapter,
};
use fanout_store::{MemoryStore, SharedKvStore};
use std::{path::Path, sync::Arc, time::Duration};
use tracing::{info, instrument};

use crate::dispatch::{DispatchOptions, DispatchOrchestrator};

pub struct FanoutApp {
    settings: Settings,
    store: SharedKvStore,
    cache: StaleWhileRevalidateCache,
    orchestrator: DispatchOrchestrator,
}

async fn build_store(settings: &StoreSettings) -> anyhow::Result<SharedKvStore> {
    match settings.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "redis")]
        StoreBackend::Redis => {
            let uri = settings
                .uri
                .as_deref()
                .context("store.uri is required for the redis backend")?;
            let store = fanout_store::RedisStore::connect(uri)
                .await
                .context("failed to connect to redis")?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        StoreBackend::Redis => {
            anyhow::bail!("store.backend is redis but fanout was built without the `redis` feature")
        }
    }
}

impl FanoutApp {
    /// Load `.env`, then the YAML file with environment overrides applied.
    pub async fn from_config_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let path = path.as_ref();
        let config = FanoutConfig::from_file_with_overrides(path, |key| std::env::var(key).ok())
            .with_context(|| format!("failed to load config from {}", path.display()))?;
        Self::from_settings(config.settings).await
    }

    pub async fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        Self::from_settings_with_repository(settings, Arc::new(InMemoryPostRepository::new()))
            .await
    }

    /// Like [`FanoutApp::from_settings`] with the website posts persisted
    /// through `repository`.
    #[instrument(skip_all)]
    pub async fn from_settings_with_repository(
        mut settings: Settings,
        repository: Arc<dyn PostRepository>,
    ) -> anyhow::Result<Self> {
        // fills in default API bases; env overrides were applied by the loader
        settings.apply_overrides(|_| None);
        settings.validate()?;

        let store = build_store(&settings.store).await?;
        let cache_options = CacheOptions::new(
            Duration::from_secs(settings.cache.lease_ttl),
            Duration::from_secs(settings.cache.refresh_timeout),
        )?;
        let cache = StaleWhileRevalidateCache::with_options(store.clone(), cache_options);
        let window = StalenessWindow::new(
            Duration::from_secs(settings.cache.social_read.ttl),
            Duration::from_secs(settings.cache.social_read.stale_after),
        )?;
        let client = build_http_client(HttpClientParams::from_settings(&settings.http))?;
        let retry_max_elapsed = settings.http.retry_max_elapsed();

        let mut orchestrator = DispatchOrchestrator::new(DispatchOptions::from(&settings.dispatch));

        if settings.platforms.website.enabled {
            let website = WebsiteAdapter::new(repository, cache.clone())
                .with_listing_ttl(Duration::from_secs(settings.cache.default_ttl));
            orchestrator.register(Arc::new(website));
        }

        if let Some(twitter) = &settings.platforms.twitter {
            let signer = HmacSha1Signer::new(OAuth1Credentials {
                consumer_key: twitter.consumer_key.clone(),
                consumer_secret: twitter.consumer_secret.clone(),
                access_token: twitter.access_token.clone(),
                access_token_secret: twitter.access_token_secret.clone(),
            });
            let adapter = TwitterAdapter::new(
                client.clone(),
                &twitter.api_base,
                twitter.user_id.clone(),
                Arc::new(signer),
                cache.clone(),
            )?
            .with_window(window)
            .with_retry_max_elapsed(retry_max_elapsed);
            orchestrator.register(Arc::new(adapter));
        }

        if let Some(facebook) = &settings.platforms.facebook {
            let refresher = GraphTokenRefresher::new(
                client.clone(),
                &facebook.graph_base,
                facebook.app_id.clone(),
                facebook.app_secret.clone(),
            )?;
            let adapter = FacebookAdapter::new(
                client.clone(),
                &facebook.graph_base,
                facebook.page_id.clone(),
                facebook.access_token.clone(),
                Arc::new(refresher),
                cache.clone(),
            )?
            .with_window(window)
            .with_retry_max_elapsed(retry_max_elapsed);
            orchestrator.register(Arc::new(adapter));
        }

        info!(
            backend = ?settings.store.backend,
            platforms = ?orchestrator.platforms(),
            "fanout initialized"
        );

        Ok(Self {
            settings,
            store,
            cache,
            orchestrator,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &SharedKvStore {
        &self.store
    }

    pub fn cache(&self) -> &StaleWhileRevalidateCache {
        &self.cache
    }

    pub fn orchestrator(&self) -> &DispatchOrchestrator {
        &self.orchestrator
    }

    /// Drop every `social-read:*` entry, listings and user lookups alike.
    pub async fn invalidate_social_reads(&self) -> anyhow::Result<u64> {
        let removed = self
            .cache
            .invalidate_matching(keys::SOCIAL_READ_PATTERN)
            .await?;
        info!(removed, "Invalidated social read cache");
        Ok(removed)
    }
}
