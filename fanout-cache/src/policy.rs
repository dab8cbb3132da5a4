use derive_builder::Builder;
use std::time::Duration;

use crate::CacheError;

/// Lifetime of entries in the plain `default` namespace.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

const DEFAULT_LEASE_TTL: Duration = Duration::from_secs(30);
const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(25);

const SOCIAL_READ_TTL: Duration = Duration::from_secs(86_400);
const SOCIAL_READ_STALE_AFTER: Duration = Duration::from_secs(900);

/// Staleness policy of one cache namespace.
///
/// `ttl` bounds how long an entry may be served at all, `stale_after` the age
/// past which a hit triggers a background refresh. `stale_after < ttl` holds
/// for every constructed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessWindow {
    ttl: Duration,
    stale_after: Duration,
}

impl StalenessWindow {
    pub fn new(ttl: Duration, stale_after: Duration) -> Result<Self, CacheError> {
        if stale_after >= ttl {
            return Err(CacheError::InvalidWindow { ttl, stale_after });
        }
        Ok(Self { ttl, stale_after })
    }

    /// One-upstream-call-per-day class of limit: 24h ttl, 15 minute staleness.
    pub fn social_read() -> Self {
        Self {
            ttl: SOCIAL_READ_TTL,
            stale_after: SOCIAL_READ_STALE_AFTER,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    pub fn is_stale(&self, age: Duration) -> bool {
        age > self.stale_after
    }
}

/// Refresh lease settings.
///
/// `refresh_timeout < lease_ttl` holds for every constructed value, so a
/// running refresh always owns its lease.
#[derive(Builder, Clone, Debug)]
#[builder(public, setter(into), build_fn(validate = "Self::validate"))]
pub struct CacheOptions {
    /// How long a refresh lease blocks other refreshes of the same key.
    #[builder(default = "DEFAULT_LEASE_TTL")]
    pub lease_ttl: Duration,
    /// Upper bound on a background refresh; the lease is released afterwards.
    #[builder(default = "DEFAULT_REFRESH_TIMEOUT")]
    pub refresh_timeout: Duration,
}

fn check_lease(lease_ttl: Duration, refresh_timeout: Duration) -> Result<(), CacheError> {
    if refresh_timeout >= lease_ttl {
        return Err(CacheError::InvalidLease {
            lease_ttl,
            refresh_timeout,
        });
    }
    Ok(())
}

impl CacheOptions {
    pub fn new(lease_ttl: Duration, refresh_timeout: Duration) -> Result<Self, CacheError> {
        check_lease(lease_ttl, refresh_timeout)?;
        Ok(Self {
            lease_ttl,
            refresh_timeout,
        })
    }
}

impl CacheOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        check_lease(
            self.lease_ttl.unwrap_or(DEFAULT_LEASE_TTL),
            self.refresh_timeout.unwrap_or(DEFAULT_REFRESH_TIMEOUT),
        )
        .map_err(|e| e.to_string())
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            lease_ttl: DEFAULT_LEASE_TTL,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
        }
    }
}
