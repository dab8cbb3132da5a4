//! # fanout
//!
//! Publish one piece of content to several platforms at once and keep their
//! rate-limited read APIs behind a stale-while-revalidate cache.
//!
//! ## Crates
//!
//! - `fanout-store`: key-value store with per-key expiry (memory, Redis)
//! - `fanout-cache`: stale-while-revalidate cache and key namespaces
//! - `fanout-platforms`: website, OAuth1 and token-auth platform adapters
//! - `fanout-config`: YAML settings and HTTP client construction
//!
//! This crate ties them together: [`dispatch`] fans an authoring request out
//! to the registered adapters and aggregates per-platform results,
//! [`app::FanoutApp`] builds everything from a config file.
//!
//! ```no_run
//! use fanout::prelude::*;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let app = FanoutApp::from_config_file("config/fanout.yml").await?;
//! let request = PublishRequest::new("Release", "v0.2 is out", ["website", "twitter"]);
//! let response = app.orchestrator().dispatch(&request).await?.into_response();
//! println!("{}", response.message);
//! # Ok(())
//! # }
//! ```
pub mod app;
pub mod dispatch;
pub mod observability;
pub mod prelude;

pub use fanout_cache as cache;
pub use fanout_config as config;
pub use fanout_platforms as platforms;
pub use fanout_store as store;
// re-export
pub use async_trait;
pub use serde;
pub use serde_json;
pub use thiserror;
pub use tracing;
pub use tracing_subscriber;
