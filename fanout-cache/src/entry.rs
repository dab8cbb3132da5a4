use chrono::{DateTime, TimeZone, Utc};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::CacheError;

/// Upstream response that can be cached.
///
/// Payloads carry an explicit success flag and a "data present" marker. Only a
/// successful payload that actually has data is written to or served from the
/// cache; a stored payload claiming success without data is treated as a miss.
pub trait CachePayload:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    fn is_success(&self) -> bool;

    fn has_data(&self) -> bool;

    fn is_cacheable(&self) -> bool {
        self.is_success() && self.has_data()
    }
}

/// Raw JSON payloads follow the `{ "success": bool, "data": ... }` envelope.
impl CachePayload for serde_json::Value {
    fn is_success(&self) -> bool {
        self.get("success").and_then(serde_json::Value::as_bool) == Some(true)
    }

    fn has_data(&self) -> bool {
        self.get("data").is_some_and(|data| !data.is_null())
    }
}

/// A payload read back from the store together with the time it was stored.
#[derive(Debug, Clone)]
pub struct CachedEntry<T> {
    pub payload: T,
    pub stored_at: DateTime<Utc>,
}

impl<T> CachedEntry<T>
where
    T: CachePayload,
{
    pub(crate) fn decode(payload: &str, stored_at: &str) -> Result<Self, CacheError> {
        let payload: T = serde_json::from_str(payload)
            .map_err(|e| CacheError::Deserialization(e.to_string()))?;
        let millis: i64 = stored_at
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| {
                CacheError::Deserialization(e.to_string())
            })?;
        let stored_at = Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
            CacheError::Deserialization(format!("invalid timestamp {millis}"))
        })?;
        Ok(Self { payload, stored_at })
    }

    /// Age at `now`; an entry stamped in the future has zero age.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.stored_at).to_std().unwrap_or_default()
    }
}

pub(crate) fn encode_payload<T: CachePayload>(payload: &T) -> Result<String, CacheError> {
    serde_json::to_string(payload).map_err(|e| CacheError::Serialization(e.to_string()))
}

pub(crate) fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.timestamp_millis().to_string()
}
