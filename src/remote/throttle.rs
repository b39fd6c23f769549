//! remote::throttle
//!
//! Concurrency cap for any content source.
//!
//! The tree walker fans out one request per directory child with no limit of
//! its own. Wrapping the source in a [`ThrottledSource`] bounds the number of
//! requests in flight at any moment without changing the walk's structure:
//! a permit is held only for the duration of a single `fetch`, never while
//! a directory waits for its children, so nested directories cannot starve
//! each other of permits.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use super::traits::{ContentSource, Payload, RemoteError, ResponseKind};
use crate::core::types::Target;

/// A content source that allows at most `limit` concurrent requests.
pub struct ThrottledSource<S> {
    inner: S,
    permits: Arc<Semaphore>,
    limit: usize,
}

impl<S: ContentSource> ThrottledSource<S> {
    /// Wrap `inner`. A `limit` of zero is treated as one.
    pub fn new(inner: S, limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            inner,
            permits: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ContentSource> ContentSource for ThrottledSource<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn fetch(&self, target: &Target, kind: ResponseKind) -> Result<Payload, RemoteError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| RemoteError::Network(format!("request limiter closed: {}", e)))?;
        self.inner.fetch(target, kind).await
    }
}
