//! HTTP client construction for upstream platform calls.
//!
//! Every client built here carries a request timeout and a connect timeout so
//! no upstream call can block indefinitely. Reads that are safe to repeat use
//! [`read_retry_policy`] with `backoff::future::retry`.
//!
//! # Example
//! ```no_run
//! use fanout_config::{HttpClientParams, HttpSettings, build_http_client};
//!
//! let settings = HttpSettings::default();
//! let params = HttpClientParams::from_settings(&settings);
//! let client = build_http_client(params).unwrap();
//! ```
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::Duration;

use crate::{ConfigError, HttpSettings};

/// Parameters for configuring an HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientParams<'a> {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: &'a str,
}

impl<'a> HttpClientParams<'a> {
    pub fn from_settings(settings: &'a HttpSettings) -> Self {
        Self {
            timeout: settings.timeout(),
            connect_timeout: settings.connect_timeout(),
            user_agent: &settings.user_agent,
        }
    }
}

/// Builds a rustls-backed `reqwest::Client` with the given timeouts and user
/// agent.
pub fn build_http_client(
    params: HttpClientParams,
) -> Result<reqwest::Client, ConfigError> {
    if params.timeout.is_zero() {
        return Err(ConfigError::Invalid {
            field: "http.timeout".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let client = reqwest::ClientBuilder::new()
        .use_rustls_tls()
        .timeout(params.timeout)
        .connect_timeout(params.connect_timeout)
        .user_agent(params.user_agent)
        .build()?;
    Ok(client)
}

/// Exponential backoff for idempotent reads, bounded by `max_elapsed`.
pub fn read_retry_policy(max_elapsed: Duration) -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(200))
        .with_max_interval(Duration::from_secs(5))
        .with_max_elapsed_time(Some(max_elapsed))
        .build()
}
