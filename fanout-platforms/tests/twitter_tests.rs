use fanout_cache::{StaleWhileRevalidateCache, keys};
use fanout_platforms::{
    PlatformAdapter, PlatformError, PlatformId, RequestSigner, TwitterAdapter,
};
use fanout_store::{KvStore, MemoryStore, SharedKvStore};
use httpmock::MockServer;
use reqwest::Method;
use serde_json::json;
use std::{sync::Arc, time::Duration};
use url::Url;

const AUTH: &str = "OAuth test-signature";

struct StaticSigner;

impl RequestSigner for StaticSigner {
    fn authorization(&self, _method: &Method, _url: &Url) -> Result<String, PlatformError> {
        Ok(AUTH.to_string())
    }
}

fn adapter_with_client(
    server: &MockServer,
    client: reqwest::Client,
) -> (TwitterAdapter, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let shared: SharedKvStore = store.clone();
    let adapter = TwitterAdapter::new(
        client,
        &server.base_url(),
        "42",
        Arc::new(StaticSigner),
        StaleWhileRevalidateCache::new(shared),
    )
    .unwrap()
    .with_retry_max_elapsed(Duration::from_millis(300));
    (adapter, store)
}

fn adapter(server: &MockServer) -> (TwitterAdapter, Arc<MemoryStore>) {
    adapter_with_client(server, reqwest::Client::new())
}

#[tokio::test]
async fn test_publish_sends_signed_text() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("POST")
                .path("/2/tweets")
                .header("authorization", AUTH)
                .json_body(json!({"text": "Hello\n\nWorld"}));
            then.status(201)
                .header("content-type", "application/json")
                .json_body(json!({"data": {"id": "10", "text": "Hello\n\nWorld"}}));
        })
        .await;

    let (adapter, _) = adapter(&server);
    let result = adapter.publish("Hello", "World").await;

    mock.assert_async().await;
    assert!(result.is_success());
    assert_eq!(result.platform(), PlatformId::Twitter);
    assert_eq!(result.data().unwrap()["id"], "10");
}

#[tokio::test]
async fn test_publish_surfaces_upstream_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("POST").path("/2/tweets");
            then.status(403).json_body(json!({
                "title": "Forbidden",
                "detail": "You are not allowed to create a Tweet with duplicate content.",
                "status": 403
            }));
        })
        .await;

    let (adapter, _) = adapter(&server);
    let result = adapter.publish("Hello", "World").await;

    assert!(!result.is_success());
    let message = result.error_message().unwrap();
    assert!(message.contains("403"));
    assert!(message.contains("duplicate content"));
}

#[tokio::test]
async fn test_update_replaces_post() {
    let server = MockServer::start_async().await;
    let delete = server
        .mock_async(|when, then| {
            when.method("DELETE").path("/2/tweets/1");
            then.status(200).json_body(json!({"data": {"deleted": true}}));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method("POST")
                .path("/2/tweets")
                .json_body(json!({"text": "New\n\nText"}));
            then.status(201).json_body(json!({"data": {"id": "2", "text": "New\n\nText"}}));
        })
        .await;

    let (adapter, _) = adapter(&server);
    let result = adapter.update("1", "New", "Text").await;

    delete.assert_async().await;
    create.assert_async().await;
    assert!(result.is_success());
    let data = result.data().unwrap();
    assert_eq!(data["replacedId"], "1");
    assert_eq!(data["post"]["id"], "2");
}

#[tokio::test]
async fn test_update_reports_lost_content_when_recreate_fails() {
    let server = MockServer::start_async().await;
    let delete = server
        .mock_async(|when, then| {
            when.method("DELETE").path("/2/tweets/1");
            then.status(200).json_body(json!({"data": {"deleted": true}}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method("POST").path("/2/tweets");
            then.status(403).json_body(json!({"detail": "duplicate content"}));
        })
        .await;

    let (adapter, _) = adapter(&server);
    let result = adapter.update("1", "New", "Text").await;

    delete.assert_async().await;
    assert!(!result.is_success());
    let message = result.error_message().unwrap();
    assert!(message.starts_with("old content removed, new content not created"));
    assert!(message.contains("duplicate content"));
}

#[tokio::test]
async fn test_update_aborts_when_delete_fails() {
    let server = MockServer::start_async().await;
    let delete = server
        .mock_async(|when, then| {
            when.method("DELETE").path("/2/tweets/1");
            then.status(404).json_body(json!({
                "title": "Not Found Error",
                "detail": "Could not find tweet with id: [1]."
            }));
        })
        .await;

    let (adapter, _) = adapter(&server);
    let result = adapter.update("1", "New", "Text").await;

    delete.assert_async().await;
    assert!(!result.is_success());
    assert!(
        result
            .error_message()
            .unwrap()
            .starts_with("update aborted, original content left in place")
    );
}

#[tokio::test]
async fn test_list_is_served_from_cache() {
    let server = MockServer::start_async().await;
    let listing = server
        .mock_async(|when, then| {
            when.method("GET")
                .path("/2/users/42/tweets")
                .header("authorization", AUTH);
            then.status(200).json_body(json!({
                "data": [{"id": "1", "text": "first"}],
                "meta": {"result_count": 1}
            }));
        })
        .await;

    let (adapter, store) = adapter(&server);
    let first = adapter.list().await;
    let second = adapter.list().await;

    listing.assert_async().await;
    assert!(first.is_success());
    assert_eq!(first, second);
    assert_eq!(first.data().unwrap()[0]["id"], "1");
    assert!(store.get("social-read:listing:twitter-like:42").await.unwrap().is_some());
    assert!(store.get("social-read:listing:twitter-like:42:ts").await.unwrap().is_some());
}

#[tokio::test]
async fn test_empty_account_lists_no_posts() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/2/users/42/tweets");
            then.status(200).json_body(json!({"meta": {"result_count": 0}}));
        })
        .await;

    let (adapter, _) = adapter(&server);
    let result = adapter.list().await;

    assert!(result.is_success());
    assert_eq!(result.data(), Some(&json!([])));
}

#[tokio::test]
async fn test_failed_listing_is_not_cached() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/2/users/42/tweets");
            then.status(401).json_body(json!({"title": "Unauthorized"}));
        })
        .await;

    let (adapter, store) = adapter(&server);
    let result = adapter.list().await;

    assert!(!result.is_success());
    assert!(store.get(&adapter.listing_key()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_publish_invalidates_listing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/2/users/42/tweets");
            then.status(200).json_body(json!({"data": [{"id": "1", "text": "first"}]}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method("POST").path("/2/tweets");
            then.status(201).json_body(json!({"data": {"id": "2", "text": "second"}}));
        })
        .await;

    let (adapter, store) = adapter(&server);
    adapter.list().await;
    assert!(store.get(&adapter.listing_key()).await.unwrap().is_some());

    let published = adapter.publish("second", "post").await;
    assert!(published.is_success());
    assert!(store.get(&adapter.listing_key()).await.unwrap().is_none());
    assert!(
        store
            .get(&keys::timestamp_key(&adapter.listing_key()))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_me_is_cached_under_user_key() {
    let server = MockServer::start_async().await;
    let me = server
        .mock_async(|when, then| {
            when.method("GET").path("/2/users/me");
            then.status(200)
                .json_body(json!({"data": {"id": "42", "username": "fanout"}}));
        })
        .await;

    let (adapter, store) = adapter(&server);
    let first = adapter.me().await;
    let second = adapter.me().await;

    me.assert_async().await;
    assert_eq!(first, second);
    assert_eq!(first.data().unwrap()["username"], "fanout");
    assert!(store.get("social-read:user").await.unwrap().is_some());
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("POST").path("/2/tweets");
            then.status(201)
                .delay(Duration::from_secs(2))
                .json_body(json!({"data": {"id": "3"}}));
        })
        .await;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let (adapter, _) = adapter_with_client(&server, client);
    let result = adapter.publish("slow", "post").await;

    assert!(!result.is_success());
    assert_eq!(result.error_message(), Some("upstream call timed out"));
}
