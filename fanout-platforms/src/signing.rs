//! Request signing strategies.
//!
//! The OAuth1 adapter never builds signatures inline: it asks its
//! [`RequestSigner`] for an `Authorization` header given the method and the
//! full URL (query string included).
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::{Rng, distr::Alphanumeric};
use reqwest::Method;
use sha1::Sha1;
use url::Url;

use crate::PlatformError;

/// RFC 3986 unreserved characters stay literal, everything else is encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const NONCE_LEN: usize = 32;

pub trait RequestSigner: Send + Sync {
    /// Value of the `Authorization` header for this request.
    fn authorization(&self, method: &Method, url: &Url) -> Result<String, PlatformError>;
}

#[derive(Clone)]
pub struct OAuth1Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl std::fmt::Debug for OAuth1Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth1Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("access_token", &self.access_token)
            .finish_non_exhaustive()
    }
}

/// OAuth 1.0a HMAC-SHA1 signer with a fixed consumer and access token.
#[derive(Debug, Clone)]
pub struct HmacSha1Signer {
    credentials: OAuth1Credentials,
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

impl HmacSha1Signer {
    pub fn new(credentials: OAuth1Credentials) -> Self {
        Self { credentials }
    }

    fn oauth_params(&self, nonce: &str, timestamp: i64) -> Vec<(String, String)> {
        vec![
            (
                "oauth_consumer_key".to_string(),
                self.credentials.consumer_key.clone(),
            ),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), self.credentials.access_token.clone()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ]
    }

    /// Signature base string: method, base URL and the sorted, encoded
    /// parameter string, each encoded and joined with `&`.
    fn base_string(
        method: &Method,
        url: &Url,
        oauth_params: &[(String, String)],
    ) -> String {
        let mut base_url = url.clone();
        base_url.set_query(None);
        base_url.set_fragment(None);

        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (encode(&k), encode(&v)))
            .chain(oauth_params.iter().map(|(k, v)| (encode(k), encode(v))))
            .collect();
        params.sort();

        let param_string = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        format!(
            "{}&{}&{}",
            method.as_str().to_ascii_uppercase(),
            encode(base_url.as_str()),
            encode(&param_string)
        )
    }

    pub fn signature(
        &self,
        method: &Method,
        url: &Url,
        nonce: &str,
        timestamp: i64,
    ) -> Result<String, PlatformError> {
        let base = Self::base_string(method, url, &self.oauth_params(nonce, timestamp));
        let key = format!(
            "{}&{}",
            encode(&self.credentials.consumer_secret),
            encode(&self.credentials.access_token_secret)
        );

        let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
            .map_err(|e| PlatformError::InvalidRequest(e.to_string()))?;
        mac.update(base.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Header for an explicit nonce and timestamp.
    pub fn authorization_with(
        &self,
        method: &Method,
        url: &Url,
        nonce: &str,
        timestamp: i64,
    ) -> Result<String, PlatformError> {
        let signature = self.signature(method, url, nonce, timestamp)?;
        let mut params = self.oauth_params(nonce, timestamp);
        params.push(("oauth_signature".to_string(), signature));
        params.sort();

        let fields = params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {fields}"))
    }
}

impl RequestSigner for HmacSha1Signer {
    fn authorization(&self, method: &Method, url: &Url) -> Result<String, PlatformError> {
        let nonce: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LEN)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp();
        self.authorization_with(method, url, &nonce, timestamp)
    }
}
