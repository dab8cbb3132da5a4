//! Token-authenticated adapter for the Facebook-like Graph API.
//!
//! The page access token travels as the `access_token` query parameter. An
//! upstream error with code 190 marks the token as invalid: the adapter then
//! refreshes it once through its [`TokenRefresher`] and retries the call once
//! before giving up.
use async_trait::async_trait;
use fanout_cache::{StaleWhileRevalidateCache, StalenessWindow, keys};
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::platform::compose_message;
use crate::transport::{endpoint, parse_base, retry_read, segment, send};
use crate::{PlatformAdapter, PlatformError, PlatformId, PlatformResult};

/// Graph API error code for an expired or revoked access token.
const INVALID_TOKEN_CODE: i64 = 190;
const DEFAULT_RETRY_MAX_ELAPSED: Duration = Duration::from_secs(30);

#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchange `current` for a fresh access token.
    async fn refresh(&self, current: &str) -> Result<String, PlatformError>;
}

/// Exchanges tokens at `oauth/access_token` with `grant_type=fb_exchange_token`.
pub struct GraphTokenRefresher {
    client: Client,
    graph_base: Url,
    app_id: String,
    app_secret: String,
}

impl GraphTokenRefresher {
    pub fn new(
        client: Client,
        graph_base: &str,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Result<Self, PlatformError> {
        Ok(Self {
            client,
            graph_base: parse_base(graph_base)?,
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        })
    }
}

#[async_trait]
impl TokenRefresher for GraphTokenRefresher {
    async fn refresh(&self, current: &str) -> Result<String, PlatformError> {
        if self.app_id.is_empty() || self.app_secret.is_empty() {
            return Err(PlatformError::InvalidRequest(
                "token refresh needs app_id and app_secret".into(),
            ));
        }
        let url = endpoint(&self.graph_base, "oauth/access_token")?;
        let request = self.client.get(url).query(&[
            ("grant_type", "fb_exchange_token"),
            ("client_id", self.app_id.as_str()),
            ("client_secret", self.app_secret.as_str()),
            ("fb_exchange_token", current),
        ]);

        let (status, body) = send(request).await?;
        if !status.is_success() {
            let (_, message) = graph_error(&body, status);
            return Err(PlatformError::Upstream {
                status: status.as_u16(),
                message: format!("token refresh failed: {message}"),
            });
        }
        body.get("access_token")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| PlatformError::Decode("token response without access_token".into()))
    }
}

/// Error code and message of a Graph error body.
fn graph_error(body: &Value, status: StatusCode) -> (Option<i64>, String) {
    let error = body.get("error");
    let code = error.and_then(|e| e.get("code")).and_then(Value::as_i64);
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| match body {
            Value::String(text) => text.clone(),
            _ => status.canonical_reason().unwrap_or("unknown error").to_string(),
        });
    (code, message)
}

#[derive(Clone)]
pub struct FacebookAdapter {
    client: Client,
    graph_base: Url,
    page_id: String,
    token: Arc<RwLock<String>>,
    refresher: Arc<dyn TokenRefresher>,
    cache: StaleWhileRevalidateCache,
    window: StalenessWindow,
    retry_max_elapsed: Duration,
}

impl FacebookAdapter {
    pub fn new(
        client: Client,
        graph_base: &str,
        page_id: impl Into<String>,
        access_token: impl Into<String>,
        refresher: Arc<dyn TokenRefresher>,
        cache: StaleWhileRevalidateCache,
    ) -> Result<Self, PlatformError> {
        Ok(Self {
            client,
            graph_base: parse_base(graph_base)?,
            page_id: page_id.into(),
            token: Arc::new(RwLock::new(access_token.into())),
            refresher,
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

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn listing_key(&self) -> String {
        keys::social_listing_key(PlatformId::Facebook.as_str(), &self.page_id)
    }

    /// The token the next call will use.
    pub async fn access_token(&self) -> String {
        self.token.read().await.clone()
    }

    async fn attempt(
        &self,
        method: &Method,
        path: &str,
        form: &[(&str, &str)],
        token: &str,
    ) -> Result<Value, PlatformError> {
        let mut url = endpoint(&self.graph_base, path)?;
        url.query_pairs_mut().append_pair("access_token", token);

        let mut request = self.client.request(method.clone(), url);
        if !form.is_empty() {
            request = request.form(form);
        }

        let (status, body) = send(request).await?;
        if status.is_success() {
            return Ok(body);
        }
        match graph_error(&body, status) {
            (Some(INVALID_TOKEN_CODE), message) => Err(PlatformError::AuthExpired(message)),
            (_, message) => Err(PlatformError::Upstream {
                status: status.as_u16(),
                message,
            }),
        }
    }

    /// Replace `stale` with a fresh token unless a concurrent call already did.
    async fn refresh_token(&self, stale: &str) -> Result<(), PlatformError> {
        let mut token = self.token.write().await;
        if token.as_str() != stale {
            debug!("Access token already refreshed by a concurrent call");
            return Ok(());
        }
        *token = self.refresher.refresh(stale).await?;
        info!("Refreshed access token");
        Ok(())
    }

    /// One call with at most one refresh-and-retry cycle on an invalid token.
    async fn call(
        &self,
        method: Method,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<Value, PlatformError> {
        let token = self.access_token().await;
        match self.attempt(&method, path, form, &token).await {
            Err(PlatformError::AuthExpired(reason)) => {
                warn!("Access token rejected, refreshing: {}", reason);
                self.refresh_token(&token).await?;
                let fresh = self.access_token().await;
                match self.attempt(&method, path, form, &fresh).await {
                    Err(PlatformError::AuthExpired(reason)) => Err(PlatformError::Upstream {
                        status: StatusCode::UNAUTHORIZED.as_u16(),
                        message: format!("access token rejected after refresh: {reason}"),
                    }),
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn invalidate_listing(&self) {
        if let Err(e) = self.cache.invalidate(&self.listing_key()).await {
            warn!("Failed to invalidate listing cache: {}", e);
        }
    }

    async fn list_live(&self) -> PlatformResult {
        let path = format!("{}/feed", segment(&self.page_id));
        let result = retry_read(self.retry_max_elapsed, || {
            self.call(Method::GET, &path, &[])
        })
        .await
        .map(|body| body.get("data").cloned().unwrap_or_else(|| json!([])));
        PlatformResult::from_result(PlatformId::Facebook, result)
    }
}

#[async_trait]
impl PlatformAdapter for FacebookAdapter {
    fn platform(&self) -> PlatformId {
        PlatformId::Facebook
    }

    #[instrument(skip_all, fields(platform = "facebook-like"))]
    async fn publish(&self, title: &str, description: &str) -> PlatformResult {
        let message = compose_message(title, description);
        let path = format!("{}/feed", segment(&self.page_id));
        let result = self
            .call(Method::POST, &path, &[("message", message.as_str())])
            .await;
        if result.is_ok() {
            self.invalidate_listing().await;
        }
        PlatformResult::from_result(PlatformId::Facebook, result)
    }

    #[instrument(skip(self, title, description), fields(platform = "facebook-like"))]
    async fn update(&self, post_id: &str, title: &str, description: &str) -> PlatformResult {
        let message = compose_message(title, description);
        let result = self
            .call(Method::POST, &segment(post_id), &[("message", message.as_str())])
            .await
            .map(|body| json!({ "id": post_id, "response": body }));
        if result.is_ok() {
            self.invalidate_listing().await;
        }
        PlatformResult::from_result(PlatformId::Facebook, result)
    }

    #[instrument(skip(self), fields(platform = "facebook-like"))]
    async fn delete(&self, post_id: &str) -> PlatformResult {
        let result = self
            .call(Method::DELETE, &segment(post_id), &[])
            .await
            .map(|_| json!({ "id": post_id, "deleted": true }));
        if result.is_ok() {
            self.invalidate_listing().await;
        }
        PlatformResult::from_result(PlatformId::Facebook, result)
    }

    #[instrument(skip_all, fields(platform = "facebook-like"))]
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
