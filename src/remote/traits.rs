//! remote::traits
//!
//! Content source trait for reading a remote repository tree.
//!
//! # Design
//!
//! The `ContentSource` trait is async because every call is one network
//! round trip. Implementations perform a single attempt per call: there is
//! no retry and no caching at this layer.
//!
//! # Example
//!
//! ```ignore
//! use remote_deploy::remote::{ContentSource, RemoteError};
//! use remote_deploy::core::types::{RemoteLocation, Target};
//!
//! async fn count_children(source: &dyn ContentSource) -> Result<usize, RemoteError> {
//!     let location = RemoteLocation::new("octocat", "hello-world", "src")?;
//!     let listing = source.listing(&Target::Location(location)).await?;
//!     Ok(listing.len())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{Listing, Target, TypeError};

/// Errors from content requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The path does not exist at the requested revision.
    #[error("resource not found at: {0}")]
    NotFound(String),

    /// Any other non-success status; `message` is the response body.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body returned by the server
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// A listing entry could not be decoded or classified.
    #[error("malformed content entry: {0}")]
    MalformedEntry(String),
}

impl From<TypeError> for RemoteError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::MalformedEntry(msg) => RemoteError::MalformedEntry(msg),
            TypeError::InvalidLocation(msg) => RemoteError::MalformedEntry(msg),
        }
    }
}

/// Which representation to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Structured JSON listing.
    Listing,
    /// Raw file bytes.
    Raw,
}

impl ResponseKind {
    /// Value of the `Accept` header selecting this representation.
    pub fn accept_header(self) -> &'static str {
        match self {
            ResponseKind::Listing => "application/vnd.github.v3.json",
            ResponseKind::Raw => "application/vnd.github.v3.raw",
        }
    }
}

/// A successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Raw(Vec<u8>),
    Listing(Listing),
}

/// A readable remote repository tree.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the tree walker issues many
/// requests concurrently through a shared reference.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Source name for diagnostics (e.g., "github", "mock").
    fn name(&self) -> &'static str;

    /// Perform exactly one request for `target` in the given representation.
    ///
    /// # Errors
    ///
    /// - `NotFound` on HTTP 404
    /// - `Api` on any other non-success status
    /// - `Network` if the request could not be sent
    /// - `MalformedEntry` if a listing body does not decode
    async fn fetch(&self, target: &Target, kind: ResponseKind) -> Result<Payload, RemoteError>;

    /// Fetch and decode a listing.
    async fn listing(&self, target: &Target) -> Result<Listing, RemoteError> {
        match self.fetch(target, ResponseKind::Listing).await? {
            Payload::Listing(listing) => Ok(listing),
            Payload::Raw(_) => Err(RemoteError::MalformedEntry(format!(
                "expected a listing for {}, got raw content",
                target
            ))),
        }
    }

    /// Fetch raw file content.
    async fn raw(&self, target: &Target) -> Result<Vec<u8>, RemoteError> {
        match self.fetch(target, ResponseKind::Raw).await? {
            Payload::Raw(bytes) => Ok(bytes),
            Payload::Listing(_) => Err(RemoteError::MalformedEntry(format!(
                "expected raw content for {}, got a listing",
                target
            ))),
        }
    }
}
