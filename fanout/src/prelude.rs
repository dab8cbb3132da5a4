pub use crate::app::FanoutApp;
pub use crate::dispatch::{
    DeleteRequest, DispatchOptions, DispatchOptionsBuilder, DispatchOrchestrator,
    DispatchOutcome, DispatchResponse, DispatchStats, PublishRequest, UpdateRequest,
    ValidationError,
};
pub use crate::observability::init_tracing;
pub use fanout_cache::{StaleWhileRevalidateCache, StalenessWindow};
pub use fanout_config::{FanoutConfig, Settings};
pub use fanout_platforms::{
    PlatformAdapter, PlatformId, PlatformResult, SharedAdapter,
};
pub use fanout_store::{KvStore, MemoryStore, SharedKvStore};
