use fanout_platforms::PlatformId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("description must not be empty")]
    EmptyDescription,

    #[error("at least one platform is required")]
    NoPlatforms,

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("post id for {0} must not be empty")]
    EmptyPostId(PlatformId),
}

/// One authoring submission fanned out to `platforms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub title: String,
    pub description: String,
    pub platforms: Vec<String>,
}

/// New content for posts that already exist, keyed by platform name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub title: String,
    pub description: String,
    pub posts: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub posts: BTreeMap<String, String>,
}

fn check_content(title: &str, description: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if description.trim().is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(())
}

fn parse_platform(name: &str) -> Result<PlatformId, ValidationError> {
    name.parse()
        .map_err(|_| ValidationError::UnknownPlatform(name.to_string()))
}

/// Parse post targets; the first id seen for a platform wins.
fn resolve_posts(
    posts: &BTreeMap<String, String>,
) -> Result<Vec<(PlatformId, String)>, ValidationError> {
    if posts.is_empty() {
        return Err(ValidationError::NoPlatforms);
    }

    let mut targets: Vec<(PlatformId, String)> = Vec::with_capacity(posts.len());
    for (name, post_id) in posts {
        let platform = parse_platform(name)?;
        if post_id.trim().is_empty() {
            return Err(ValidationError::EmptyPostId(platform));
        }
        if !targets.iter().any(|(seen, _)| *seen == platform) {
            targets.push((platform, post_id.trim().to_string()));
        }
    }
    targets.sort_by_key(|(platform, _)| {
        PlatformId::ALL
            .iter()
            .position(|known| known == platform)
            .unwrap_or(usize::MAX)
    });
    Ok(targets)
}

impl PublishRequest {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        platforms: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            platforms: platforms.into_iter().map(Into::into).collect(),
        }
    }

    /// Target platforms in declared order, duplicates dropped.
    pub fn validate(&self) -> Result<Vec<PlatformId>, ValidationError> {
        check_content(&self.title, &self.description)?;
        if self.platforms.is_empty() {
            return Err(ValidationError::NoPlatforms);
        }

        let mut targets = Vec::with_capacity(self.platforms.len());
        for name in &self.platforms {
            let platform = parse_platform(name)?;
            if !targets.contains(&platform) {
                targets.push(platform);
            }
        }
        Ok(targets)
    }
}

impl UpdateRequest {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            posts: BTreeMap::new(),
        }
    }

    pub fn post(mut self, platform: impl Into<String>, post_id: impl Into<String>) -> Self {
        self.posts.insert(platform.into(), post_id.into());
        self
    }

    /// Targets ordered website, twitter-like, facebook-like.
    pub fn validate(&self) -> Result<Vec<(PlatformId, String)>, ValidationError> {
        check_content(&self.title, &self.description)?;
        resolve_posts(&self.posts)
    }
}

impl DeleteRequest {
    pub fn new() -> Self {
        Self {
            posts: BTreeMap::new(),
        }
    }

    pub fn post(mut self, platform: impl Into<String>, post_id: impl Into<String>) -> Self {
        self.posts.insert(platform.into(), post_id.into());
        self
    }

    pub fn validate(&self) -> Result<Vec<(PlatformId, String)>, ValidationError> {
        resolve_posts(&self.posts)
    }
}

impl Default for DeleteRequest {
    fn default() -> Self {
        Self::new()
    }
}
