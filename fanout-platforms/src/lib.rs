//! Platform adapters for fanout.
//!
//! Every adapter exposes the same [`PlatformAdapter`] capability set
//! (publish, update, delete, list) over its own upstream protocol:
//!
//! - [`WebsiteAdapter`]: local persistence through a [`PostRepository`]
//! - [`TwitterAdapter`]: OAuth1-signed requests, delete-then-recreate updates
//! - [`FacebookAdapter`]: bearer token in the query string, one
//!   refresh-and-retry cycle on an invalid token
//!
//! Adapter failures never escape as errors: they are converted into a failed
//! [`PlatformResult`] at the adapter boundary.

mod error;
pub mod facebook;
mod platform;
pub mod replace;
pub mod signing;
mod transport;
pub mod twitter;
pub mod website;

pub use error::PlatformError;
pub use facebook::{FacebookAdapter, GraphTokenRefresher, TokenRefresher};
pub use platform::{
    PlatformAdapter, PlatformId, PlatformResult, SharedAdapter, UnknownPlatform,
};
pub use replace::UpdateOutcome;
pub use signing::{HmacSha1Signer, OAuth1Credentials, RequestSigner};
pub use twitter::TwitterAdapter;
pub use website::{InMemoryPostRepository, PostRepository, WebsiteAdapter, WebsitePost};
