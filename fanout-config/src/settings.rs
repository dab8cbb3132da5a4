//! Typed view of the fanout YAML configuration.
//!
//! ```yaml
//! store:
//!   backend: redis            # or memory
//!   uri: redis://127.0.0.1:6379
//! http:
//!   timeout: 30
//!   connect_timeout: 10
//! cache:
//!   social_read: { ttl: 86400, stale_after: 900 }
//! logging:
//!   level: info
//!   json: false
//! platforms:
//!   website: { enabled: true }
//!   twitter: { user_id: "42", consumer_key: ..., ... }
//!   facebook: { page_id: "7", access_token: ..., ... }
//! ```
//! Durations are whole seconds. Credentials may be left out of the file and
//! supplied through `FANOUT_*` environment variables instead.
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: StoreSettings,
    pub http: HttpSettings,
    pub cache: CacheSettings,
    pub dispatch: DispatchSettings,
    pub logging: LoggingSettings,
    pub platforms: PlatformSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout: u64,
    pub connect_timeout: u64,
    pub user_agent: String,
    /// Longest time a retried read may keep retrying.
    pub retry_max_elapsed: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: 30,
            connect_timeout: 10,
            user_agent: concat!("fanout/", env!("CARGO_PKG_VERSION")).to_string(),
            retry_max_elapsed: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowSettings {
    pub ttl: u64,
    pub stale_after: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub default_ttl: u64,
    pub social_read: WindowSettings,
    pub lease_ttl: u64,
    pub refresh_timeout: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            social_read: WindowSettings {
                ttl: 86_400,
                stale_after: 900,
            },
            lease_ttl: 30,
            refresh_timeout: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub parallel: bool,
    pub adapter_timeout: u64,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            parallel: true,
            adapter_timeout: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    pub website: WebsiteSettings,
    pub twitter: Option<TwitterSettings>,
    pub facebook: Option<FacebookSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebsiteSettings {
    pub enabled: bool,
}

impl Default for WebsiteSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterSettings {
    pub api_base: String,
    pub user_id: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FacebookSettings {
    pub graph_base: String,
    pub page_id: String,
    pub app_id: String,
    pub app_secret: String,
    pub access_token: String,
}

/// Most upstream requests one mutation can make: a token-auth call that is
/// refreshed and retried, or the two phases of a delete-then-recreate.
pub const MAX_UPSTREAM_CALLS_PER_OPERATION: u64 = 3;

const TWITTER_API_BASE: &str = "https://api.twitter.com";
const FACEBOOK_GRAPH_BASE: &str = "https://graph.facebook.com/v19.0";

fn override_field(
    field: &mut String,
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
) {
    if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
        debug!(var, "Applied environment override");
        *field = value;
    }
}

fn require(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField(field.to_string()));
    }
    Ok(())
}

impl Settings {
    /// Fill in values from the environment. `lookup` is usually
    /// `|k| std::env::var(k).ok()`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(uri) = lookup("REDIS_URI").filter(|v| !v.is_empty()) {
            debug!(var = "REDIS_URI", "Applied environment override");
            self.store.uri = Some(uri);
        }

        if let Some(twitter) = self.platforms.twitter.as_mut() {
            override_field(&mut twitter.consumer_key, &lookup, "FANOUT_TWITTER_CONSUMER_KEY");
            override_field(
                &mut twitter.consumer_secret,
                &lookup,
                "FANOUT_TWITTER_CONSUMER_SECRET",
            );
            override_field(&mut twitter.access_token, &lookup, "FANOUT_TWITTER_ACCESS_TOKEN");
            override_field(
                &mut twitter.access_token_secret,
                &lookup,
                "FANOUT_TWITTER_ACCESS_TOKEN_SECRET",
            );
            if twitter.api_base.is_empty() {
                twitter.api_base = TWITTER_API_BASE.to_string();
            }
        }

        if let Some(facebook) = self.platforms.facebook.as_mut() {
            override_field(&mut facebook.app_secret, &lookup, "FANOUT_FACEBOOK_APP_SECRET");
            override_field(
                &mut facebook.access_token,
                &lookup,
                "FANOUT_FACEBOOK_ACCESS_TOKEN",
            );
            if facebook.graph_base.is_empty() {
                facebook.graph_base = FACEBOOK_GRAPH_BASE.to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Redis
            && self.store.uri.as_deref().is_none_or(str::is_empty)
        {
            return Err(ConfigError::MissingField("store.uri".to_string()));
        }

        if self.http.timeout == 0 {
            return Err(ConfigError::Invalid {
                field: "http.timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        // the per-request timeouts must fire before the dispatch-level one
        let slowest_operation = self
            .http
            .timeout
            .saturating_mul(MAX_UPSTREAM_CALLS_PER_OPERATION);
        if self.dispatch.adapter_timeout <= slowest_operation {
            return Err(ConfigError::Invalid {
                field: "dispatch.adapter_timeout".to_string(),
                reason: format!(
                    "{} must exceed {} (http.timeout {} x {} upstream calls)",
                    self.dispatch.adapter_timeout,
                    slowest_operation,
                    self.http.timeout,
                    MAX_UPSTREAM_CALLS_PER_OPERATION
                ),
            });
        }

        if self.cache.refresh_timeout >= self.cache.lease_ttl {
            return Err(ConfigError::Invalid {
                field: "cache.refresh_timeout".to_string(),
                reason: format!(
                    "{} must be shorter than lease_ttl {}",
                    self.cache.refresh_timeout, self.cache.lease_ttl
                ),
            });
        }

        let window = self.cache.social_read;
        if window.stale_after >= window.ttl {
            return Err(ConfigError::Invalid {
                field: "cache.social_read.stale_after".to_string(),
                reason: format!(
                    "{} must be shorter than ttl {}",
                    window.stale_after, window.ttl
                ),
            });
        }

        if let Some(twitter) = &self.platforms.twitter {
            require(&twitter.user_id, "platforms.twitter.user_id")?;
            require(&twitter.consumer_key, "platforms.twitter.consumer_key")?;
            require(&twitter.consumer_secret, "platforms.twitter.consumer_secret")?;
            require(&twitter.access_token, "platforms.twitter.access_token")?;
            require(
                &twitter.access_token_secret,
                "platforms.twitter.access_token_secret",
            )?;
        }

        if let Some(facebook) = &self.platforms.facebook {
            require(&facebook.page_id, "platforms.facebook.page_id")?;
            require(&facebook.access_token, "platforms.facebook.access_token")?;
        }

        Ok(())
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn retry_max_elapsed(&self) -> Duration {
        Duration::from_secs(self.retry_max_elapsed)
    }
}

impl DispatchSettings {
    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.adapter_timeout)
    }
}
