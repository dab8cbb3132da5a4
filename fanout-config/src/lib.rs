pub mod config;
pub mod http;
pub mod settings;

pub use backoff;
pub use config::{ConfigError, Configurable, FanoutConfig};
pub use http::{HttpClientParams, build_http_client, read_retry_policy};
pub use settings::{
    CacheSettings, DispatchSettings, FacebookSettings, HttpSettings, MAX_UPSTREAM_CALLS_PER_OPERATION,
    LoggingSettings, PlatformSettings, Settings, StoreBackend, StoreSettings, TwitterSettings,
    WebsiteSettings, WindowSettings,
};
