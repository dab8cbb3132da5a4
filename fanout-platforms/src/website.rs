//! Website adapter backed by a local post repository.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fanout_cache::{DEFAULT_TTL, StaleWhileRevalidateCache, keys};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::{PlatformAdapter, PlatformError, PlatformId, PlatformResult};

const LISTING_NAME: &str = "website:posts";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsitePost {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WebsitePost {
    pub fn new(title: &str, description: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Persistence for website posts.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, title: &str, description: &str)
    -> Result<WebsitePost, PlatformError>;

    /// `None` when no post has this id.
    async fn update(
        &self,
        id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<Option<WebsitePost>, PlatformError>;

    /// `false` when no post has this id.
    async fn delete(&self, id: Uuid) -> Result<bool, PlatformError>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<WebsitePost>, PlatformError>;
}

#[derive(Debug, Default)]
pub struct InMemoryPostRepository {
    posts: Mutex<Vec<WebsitePost>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(
        &self,
        title: &str,
        description: &str,
    ) -> Result<WebsitePost, PlatformError> {
        let post = WebsitePost::new(title, description);
        self.posts.lock().await.push(post.clone());
        Ok(post)
    }

    async fn update(
        &self,
        id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<Option<WebsitePost>, PlatformError> {
        let mut posts = self.posts.lock().await;
        let Some(post) = posts.iter_mut().find(|post| post.id == id) else {
            return Ok(None);
        };
        post.title = title.to_string();
        post.description = description.to_string();
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PlatformError> {
        let mut posts = self.posts.lock().await;
        let before = posts.len();
        posts.retain(|post| post.id != id);
        Ok(posts.len() < before)
    }

    async fn list(&self) -> Result<Vec<WebsitePost>, PlatformError> {
        let mut posts = self.posts.lock().await.clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }
}

/// Publishes to the local site. Listings go through the plain `default`
/// cache namespace and every mutation drops that entry.
#[derive(Clone)]
pub struct WebsiteAdapter {
    repository: Arc<dyn PostRepository>,
    cache: StaleWhileRevalidateCache,
    listing_ttl: Duration,
}

fn parse_post_id(post_id: &str) -> Result<Uuid, PlatformError> {
    Uuid::parse_str(post_id.trim())
        .map_err(|e| PlatformError::InvalidRequest(format!("bad post id {post_id}: {e}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, PlatformError> {
    serde_json::to_value(value).map_err(|e| PlatformError::Decode(e.to_string()))
}

impl WebsiteAdapter {
    pub fn new(repository: Arc<dyn PostRepository>, cache: StaleWhileRevalidateCache) -> Self {
        Self {
            repository,
            cache,
            listing_ttl: DEFAULT_TTL,
        }
    }

    pub fn with_listing_ttl(mut self, ttl: Duration) -> Self {
        self.listing_ttl = ttl;
        self
    }

    pub fn listing_key() -> String {
        keys::default_key(LISTING_NAME)
    }

    async fn invalidate_listing(&self) {
        if let Err(e) = self.cache.invalidate(&Self::listing_key()).await {
            warn!("Failed to invalidate website listing: {}", e);
        }
    }

    async fn try_publish(
        &self,
        title: &str,
        description: &str,
    ) -> Result<serde_json::Value, PlatformError> {
        let post = self.repository.create(title, description).await?;
        self.invalidate_listing().await;
        debug!(id = %post.id, "Created website post");
        to_json(&post)
    }

    async fn try_update(
        &self,
        post_id: &str,
        title: &str,
        description: &str,
    ) -> Result<serde_json::Value, PlatformError> {
        let id = parse_post_id(post_id)?;
        let post = self
            .repository
            .update(id, title, description)
            .await?
            .ok_or_else(|| PlatformError::Repository(format!("post {id} not found")))?;
        self.invalidate_listing().await;
        to_json(&post)
    }

    async fn try_delete(&self, post_id: &str) -> Result<serde_json::Value, PlatformError> {
        let id = parse_post_id(post_id)?;
        if !self.repository.delete(id).await? {
            return Err(PlatformError::Repository(format!("post {id} not found")));
        }
        self.invalidate_listing().await;
        Ok(json!({ "id": id, "deleted": true }))
    }

    async fn list_live(&self) -> PlatformResult {
        let result = match self.repository.list().await {
            Ok(posts) => to_json(&posts),
            Err(e) => Err(e),
        };
        PlatformResult::from_result(PlatformId::Website, result)
    }
}

#[async_trait]
impl PlatformAdapter for WebsiteAdapter {
    fn platform(&self) -> PlatformId {
        PlatformId::Website
    }

    #[instrument(skip_all, fields(platform = "website"))]
    async fn publish(&self, title: &str, description: &str) -> PlatformResult {
        PlatformResult::from_result(PlatformId::Website, self.try_publish(title, description).await)
    }

    #[instrument(skip(self, title, description), fields(platform = "website"))]
    async fn update(&self, post_id: &str, title: &str, description: &str) -> PlatformResult {
        PlatformResult::from_result(
            PlatformId::Website,
            self.try_update(post_id, title, description).await,
        )
    }

    #[instrument(skip(self), fields(platform = "website"))]
    async fn delete(&self, post_id: &str) -> PlatformResult {
        PlatformResult::from_result(PlatformId::Website, self.try_delete(post_id).await)
    }

    #[instrument(skip_all, fields(platform = "website"))]
    async fn list(&self) -> PlatformResult {
        self.cache
            .fetch_plain(&Self::listing_key(), self.listing_ttl, || self.list_live())
            .await
    }
}
