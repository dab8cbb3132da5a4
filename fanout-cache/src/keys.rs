//! Key layout for cache namespaces.
//!
//! Each cached value occupies two store keys sharing one TTL: `<key>` holds
//! the payload and `<key>:ts` the epoch-millis timestamp it was stored at.
//! `<key>:lease` marks an in-flight background refresh.

pub const DEFAULT_NAMESPACE: &str = "default";
pub const SOCIAL_READ_NAMESPACE: &str = "social-read";

/// Matches every social read key, listings and user lookups alike.
pub const SOCIAL_READ_PATTERN: &str = "social-read:*";

pub fn timestamp_key(key: &str) -> String {
    format!("{key}:ts")
}

pub fn lease_key(key: &str) -> String {
    format!("{key}:lease")
}

/// `default:{name}`
pub fn default_key(name: &str) -> String {
    format!("{DEFAULT_NAMESPACE}:{name}")
}

/// `social-read:user`
pub fn social_user_key() -> String {
    format!("{SOCIAL_READ_NAMESPACE}:user")
}

/// `social-read:listing:{platform}:{account_id}`
///
/// Account ids are only unique within one platform.
pub fn social_listing_key(platform: &str, account_id: &str) -> String {
    format!("{SOCIAL_READ_NAMESPACE}:listing:{platform}:{account_id}")
}
