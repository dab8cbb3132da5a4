use async_trait::async_trait;
use fanout_cache::CachePayload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr, sync::Arc};
use thiserror::Error;

/// Publishing targets known to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformId {
    #[serde(rename = "website")]
    Website,
    #[serde(rename = "twitter-like", alias = "twitter")]
    Twitter,
    #[serde(rename = "facebook-like", alias = "facebook")]
    Facebook,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl PlatformId {
    pub const ALL: [PlatformId; 3] =
        [PlatformId::Website, PlatformId::Twitter, PlatformId::Facebook];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::Website => "website",
            PlatformId::Twitter => "twitter-like",
            PlatformId::Facebook => "facebook-like",
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "website" => Ok(PlatformId::Website),
            "twitter-like" | "twitter" => Ok(PlatformId::Twitter),
            "facebook-like" | "facebook" => Ok(PlatformId::Facebook),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

/// Outcome of one adapter invocation. Exactly one of `data` and
/// `error_message` is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformResult {
    platform: PlatformId,
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

impl PlatformResult {
    pub fn ok(platform: PlatformId, data: Value) -> Self {
        Self {
            platform,
            success: true,
            data: Some(data),
            error_message: None,
        }
    }

    pub fn err(platform: PlatformId, message: impl Into<String>) -> Self {
        Self {
            platform,
            success: false,
            data: None,
            error_message: Some(message.into()),
        }
    }

    pub fn from_result<E: fmt::Display>(
        platform: PlatformId,
        result: Result<Value, E>,
    ) -> Self {
        match result {
            Ok(data) => Self::ok(platform, data),
            Err(e) => Self::err(platform, e.to_string()),
        }
    }

    pub fn platform(&self) -> PlatformId {
        self.platform
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

impl CachePayload for PlatformResult {
    fn is_success(&self) -> bool {
        self.success
    }

    fn has_data(&self) -> bool {
        self.data.as_ref().is_some_and(|data| !data.is_null())
    }
}

#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    fn platform(&self) -> PlatformId;

    async fn publish(&self, title: &str, description: &str) -> PlatformResult;

    async fn update(
        &self,
        post_id: &str,
        title: &str,
        description: &str,
    ) -> PlatformResult;

    async fn delete(&self, post_id: &str) -> PlatformResult;

    async fn list(&self) -> PlatformResult;
}

pub type SharedAdapter = Arc<dyn PlatformAdapter>;

/// Text body used by the social adapters, which have no separate title.
pub(crate) fn compose_message(title: &str, description: &str) -> String {
    format!("{}\n\n{}", title.trim(), description.trim())
}
