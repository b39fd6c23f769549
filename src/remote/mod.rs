//! remote
//!
//! Read access to a remote repository tree.
//!
//! # Architecture
//!
//! The `ContentSource` trait defines the single operation the rest of the
//! crate needs: fetch one node, either as a structured listing or as raw
//! bytes. The tree walker and the materializing sink only ever talk to the
//! trait, so tests substitute the in-memory [`mock`] source and a request
//! cap is layered on with [`ThrottledSource`].
//!
//! # Modules
//!
//! - `traits`: `ContentSource` trait, error and response types
//! - [`github`]: GitHub contents API implementation
//! - [`mock`]: In-memory implementation for deterministic testing
//! - `throttle`: Semaphore-based concurrency cap
//!
//! # Example
//!
//! ```ignore
//! use remote_deploy::remote::{github::GitHubContents, ContentSource, ThrottledSource};
//! use remote_deploy::core::types::{RemoteLocation, Target};
//!
//! let source = ThrottledSource::new(GitHubContents::new(token), 8);
//! let location = RemoteLocation::new("octocat", "hello-world", "force-app")?;
//! let listing = source.listing(&Target::Location(location)).await?;
//! println!("{} entries", listing.len());
//! ```

pub mod github;
pub mod mock;
mod throttle;
mod traits;

pub use throttle::ThrottledSource;
pub use traits::*;
