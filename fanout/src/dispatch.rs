pub mod orchestrator;
pub mod outcome;
pub mod request;
pub mod stats;

pub use orchestrator::{
    DispatchOptions, DispatchOptionsBuilder, DispatchOptionsBuilderError,
    DispatchOrchestrator,
};
pub use outcome::{DispatchOutcome, DispatchResponse, Operation};
pub use request::{DeleteRequest, PublishRequest, UpdateRequest, ValidationError};
pub use stats::{DispatchStats, PlatformStats};
