//! Shared request plumbing for the social adapters.
use fanout_config::{backoff, read_retry_policy};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use std::{future::Future, time::Duration};
use tracing::warn;
use url::Url;

use crate::PlatformError;

/// Parse an API base, making sure relative joins append to its path.
pub(crate) fn parse_base(base: &str) -> Result<Url, PlatformError> {
    let mut base = base.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(Url::parse(&base)?)
}

const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Escape a caller-supplied id for use as a single path segment.
pub(crate) fn segment(value: &str) -> String {
    utf8_percent_encode(value.trim(), SEGMENT).to_string()
}

pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, PlatformError> {
    Ok(base.join(path.trim_start_matches('/'))?)
}

/// Send a request and decode its JSON body. An empty body decodes to `Null`.
pub(crate) async fn send(
    request: RequestBuilder,
) -> Result<(StatusCode, Value), PlatformError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if body.trim().is_empty() {
        return Ok((status, Value::Null));
    }
    match serde_json::from_str(&body) {
        Ok(json) => Ok((status, json)),
        Err(_) if !status.is_success() => Ok((status, Value::String(body))),
        Err(e) => Err(PlatformError::Decode(e.to_string())),
    }
}

/// Retry an idempotent read on transient failures with exponential backoff.
pub(crate) async fn retry_read<T, F, Fut>(
    max_elapsed: Duration,
    mut operation: F,
) -> Result<T, PlatformError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlatformError>>,
{
    backoff::future::retry(read_retry_policy(max_elapsed), || {
        let attempt = operation();
        async move {
            attempt.await.map_err(|e| {
                if e.is_transient() {
                    warn!("Transient upstream failure, retrying: {}", e);
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        }
    })
    .await
}
