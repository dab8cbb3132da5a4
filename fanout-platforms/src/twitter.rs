//! OAuth1-signed adapter for the Twitter-like v2 API.
//!
//! The upstream has no edit endpoint, so [`TwitterAdapter::replace`] deletes
//! the old post and creates a new one, reporting which phase failed through
//! an [`UpdateOutcome`].
use async_trait::async_trait;
use fanout_cache::{StaleWhileRevalidateCache, StalenessWindow, keys};
use reqwest::{Client, Method, StatusCode, header::AUTHORIZATION};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::platform::compose_message;
use crate::transport::{endpoint, parse_base, retry_read, segment, send};
use crate::{
    PlatformAdapter, PlatformError, PlatformId, PlatformResult, RequestSigner,
    UpdateOutcome,
};

const DEFAULT_RETRY_MAX_ELAPSED: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct TwitterAdapter {
    client: Client,
    api_base: Url,
    user_id: String,
    signer: Arc<dyn RequestSigner>,
    cache: StaleWhileRevalidateCache,
    window: StalenessWindow,
    retry_max_elapsed: Duration,
}

/// Best human-readable message from a v2 error body.
fn upstream_message(body: &Value, status: StatusCode) -> String {
    if let Some(detail) = body.get("detail").and_then(Value::as_str) {
        return detail.to_string();
    }
    if let Some(title) = body.get("title").and_then(Value::as_str) {
        return title.to_string();
    }
    if let Some(message) = body
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
    {
        return message.to_string();
    }
    match body {
        Value::String(text) => text.clone(),
        _ => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    }
}

fn data_of(body: Value) -> Value {
    match body {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Object(map)),
        other => other,
    }
}

impl TwitterAdapter {
    pub fn new(
        client: Client,
        api_base: &str,
        user_id: impl Into<String>,
        signer: Arc<dyn RequestSigner>,
        cache: StaleWhileRevalidateCache,
    ) -> Result<Self, PlatformError> {
        Ok(Self {
            client,
            api_base: parse_base(api_base)?,
            user_id: user_id.into(),
            signer,
            cache,
            window: StalenessWindow::social_read(),
            retry_max_elapsed: DEFAULT_RETRY_MAX_ELAPSED,
        })
    }

    pub fn with_window(mut self, window: StalenessWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_retry_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.retry_max_elapsed = max_elapsed;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn listing_key(&self) -> String {
        keys::social_listing_key(PlatformId::Twitter.as_str(), &self.user_id)
    }

    async fn call(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value, PlatformError> {
        let authorization = self.signer.authorization(&method, &url)?;
        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, authorization);
        if let Some(body) = body {
            request = request.json(body);
        }

        let (status, body) = send(request).await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(PlatformError::Upstream {
                status: status.as_u16(),
                message: upstream_message(&body, status),
            })
        }
    }

    async fn create_post(&self, text: &str) -> Result<Value, PlatformError> {
        let url = endpoint(&self.api_base, "2/tweets")?;
        let body = self
            .call(Method::POST, url, Some(&json!({ "text": text })))
            .await?;
        Ok(data_of(body))
    }

    async fn delete_post(&self, post_id: &str) -> Result<Value, PlatformError> {
        let url = endpoint(&self.api_base, &format!("2/tweets/{}", segment(post_id)))?;
        let data = data_of(self.call(Method::DELETE, url, None).await?);
        if data.get("deleted").and_then(Value::as_bool) == Some(false) {
            return Err(PlatformError::Decode(format!(
                "post {post_id} was not deleted"
            )));
        }
        Ok(json!({ "id": post_id, "deleted": true }))
    }

    async fn invalidate_listing(&self) {
        if let Err(e) = self.cache.invalidate(&self.listing_key()).await {
            warn!("Failed to invalidate listing cache: {}", e);
        }
    }

    /// Delete `post_id`, then publish the new text in its place.
    #[instrument(skip(self, title, description), fields(platform = "twitter-like"))]
    pub async fn replace(
        &self,
        post_id: &str,
        title: &str,
        description: &str,
    ) -> UpdateOutcome {
        if let Err(error) = self.delete_post(post_id).await {
            warn!("Delete phase failed, leaving post in place: {}", error);
            return UpdateOutcome::DeleteFailed { error };
        }

        match self.create_post(&compose_message(title, description)).await {
            Ok(data) => {
                info!("Replaced post");
                UpdateOutcome::Replaced {
                    replaced_id: post_id.to_string(),
                    data,
                }
            }
            Err(error) => {
                warn!("Recreate phase failed after delete: {}", error);
                UpdateOutcome::RecreateFailed {
                    deleted_id: post_id.to_string(),
                    error,
                }
            }
        }
    }

    /// The authenticated account, cached under `social-read:user`.
    #[instrument(skip_all, fields(platform = "twitter-like"))]
    pub async fn me(&self) -> PlatformResult {
        let this = self.clone();
        self.cache
            .fetch(&keys::social_user_key(), self.window, move || {
                let this = this.clone();
                async move { this.me_live().await }
            })
            .await
    }

    async fn me_live(&self) -> PlatformResult {
        let result = async {
            let url = endpoint(&self.api_base, "2/users/me")?;
            let body =
                retry_read(self.retry_max_elapsed, || self.call(Method::GET, url.clone(), None))
                    .await?;
            Ok::<_, PlatformError>(data_of(body))
        }
        .await;
        PlatformResult::from_result(PlatformId::Twitter, result)
    }

    async fn list_live(&self) -> PlatformResult {
        let result = async {
            let url = endpoint(
                &self.api_base,
                &format!("2/users/{}/tweets", segment(&self.user_id)),
            )?;
            let body =
                retry_read(self.retry_max_elapsed, || self.call(Method::GET, url.clone(), None))
                    .await?;
            // An account without posts answers with `meta` only.
            Ok::<_, PlatformError>(body.get("data").cloned().unwrap_or_else(|| json!([])))
        }
        .await;
        debug!(success = result.is_ok(), "Fetched listing");
        PlatformResult::from_result(PlatformId::Twitter, result)
    }
}

#[async_trait]
impl PlatformAdapter for TwitterAdapter {
    fn platform(&self) -> PlatformId {
        PlatformId::Twitter
    }

    #[instrument(skip_all, fields(platform = "twitter-like"))]
    async fn publish(&self, title: &str, description: &str) -> PlatformResult {
        let result = self.create_post(&compose_message(title, description)).await;
        if result.is_ok() {
            self.invalidate_listing().await;
        }
        PlatformResult::from_result(PlatformId::Twitter, result)
    }

    async fn update(&self, post_id: &str, title: &str, description: &str) -> PlatformResult {
        let outcome = self.replace(post_id, title, description).await;
        if outcome.mutated() {
            self.invalidate_listing().await;
        }
        outcome.into_platform_result(PlatformId::Twitter)
    }

    #[instrument(skip(self), fields(platform = "twitter-like"))]
    async fn delete(&self, post_id: &str) -> PlatformResult {
        let result = self.delete_post(post_id).await;
        if result.is_ok() {
            self.invalidate_listing().await;
        }
        PlatformResult::from_result(PlatformId::Twitter, result)
    }

    #[instrument(skip_all, fields(platform = "twitter-like"))]
    async fn list(&self) -> PlatformResult {
        let this = self.clone();
        self.cache
            .fetch(&self.listing_key(), self.window, move || {
                let this = this.clone();
                async move { this.list_live().await }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_prefers_detail() {
        let body = json!({"title": "Forbidden", "detail": "duplicate content", "status": 403});
        assert_eq!(
            upstream_message(&body, StatusCode::FORBIDDEN),
            "duplicate content"
        );

        let body = json!({"errors": [{"message": "Rate limit exceeded"}]});
        assert_eq!(
            upstream_message(&body, StatusCode::TOO_MANY_REQUESTS),
            "Rate limit exceeded"
        );

        assert_eq!(
            upstream_message(&Value::Null, StatusCode::BAD_GATEWAY),
            "Bad Gateway"
        );
        assert_eq!(
            upstream_message(&json!("plain text"), StatusCode::BAD_REQUEST),
            "plain text"
        );
    }

    #[test]
    fn test_data_of_unwraps_envelope() {
        assert_eq!(data_of(json!({"data": {"id": "1"}})), json!({"id": "1"}));
        assert_eq!(data_of(json!({"id": "1"})), json!({"id": "1"}));
    }
}
