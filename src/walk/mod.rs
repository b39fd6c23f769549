//! walk
//!
//! Recursive, concurrent traversal of a remote repository tree.
//!
//! # Algorithm
//!
//! For one target the walker:
//! 1. resolves it as a listing (a file yields one entry, a directory yields
//!    its children);
//! 2. classifies every entry;
//! 3. hands files to a [`FileSink`], filtered by the [`SelectionPolicy`] in
//!    [`WalkMode::Select`];
//! 4. recurses into directories by their listing address, except for
//!    excluded names;
//! 5. drives all children of the directory concurrently and completes only
//!    when every child has completed.
//!
//! # Concurrency
//!
//! Children are polled together on a `FuturesUnordered` inside the caller's
//! task. Fan-out is unbounded; wrap the source in a
//! [`ThrottledSource`](crate::remote::ThrottledSource) to cap requests.
//! Siblings complete in any order.
//!
//! # Failure
//!
//! With [`FailurePolicy::FailFast`] (the default) any child failure fails
//! the walk. Siblings already dispatched are still driven to completion
//! before the first error (in completion order) is returned, so a directory
//! never reports done while its children are running.
//! [`FailurePolicy::Collect`] records child failures in the report instead.
//!
//! # Example
//!
//! ```ignore
//! use remote_deploy::walk::{TreeWalker, WalkOptions};
//! use remote_deploy::stage::MirrorSink;
//!
//! let walker = TreeWalker::new(&source, WalkOptions::default());
//! let sink = MirrorSink::new(&source, materializer);
//! let report = walker.walk(location, &sink).await?;
//! println!("{} files", report.files_written);
//! ```

use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::future::{self, BoxFuture, FutureExt};
use futures_util::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;

use crate::core::types::{classify, Entry, Target};
use crate::metadata::SelectionPolicy;
use crate::remote::{ContentSource, RemoteError};
use crate::stage::StageError;

/// Directory names never descended into.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules", ".sfdx", ".sf"];

/// Errors from a walk.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Stage(#[from] StageError),
}

/// A file selected for materialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    pub download_url: String,
}

/// Receiver for every selected file.
///
/// Called concurrently; implementations must tolerate overlapping calls for
/// distinct paths.
#[async_trait]
pub trait FileSink: Send + Sync {
    async fn accept(&self, file: &RemoteFile) -> Result<(), WalkError>;
}

/// Sink that only records what it was given.
///
/// Used for dry runs and in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    files: Mutex<Vec<RemoteFile>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded files, sorted by path.
    pub fn files(&self) -> Vec<RemoteFile> {
        let mut files = self
            .files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Recorded paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.files().into_iter().map(|f| f.path).collect()
    }
}

#[async_trait]
impl FileSink for RecordingSink {
    async fn accept(&self, file: &RemoteFile) -> Result<(), WalkError> {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(file.clone());
        Ok(())
    }
}

/// Which files reach the sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WalkMode {
    /// Every file.
    #[default]
    All,
    /// Only files matched by the policy.
    Select(SelectionPolicy),
}

/// What a child failure does to the walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Fail the whole walk.
    #[default]
    FailFast,
    /// Record the failure and keep going.
    Collect,
}

/// Walk configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    pub mode: WalkMode,
    pub excluded_dirs: Vec<String>,
    pub failure_policy: FailurePolicy,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            mode: WalkMode::All,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            failure_policy: FailurePolicy::FailFast,
        }
    }
}

impl WalkOptions {
    pub fn with_mode(mut self, mode: WalkMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_excluded_dirs(mut self, dirs: Vec<String>) -> Self {
        self.excluded_dirs = dirs;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

/// A child failure recorded under [`FailurePolicy::Collect`].
#[derive(Debug)]
pub struct WalkFailure {
    /// Repository path of the entry that failed.
    pub path: String,
    pub error: WalkError,
}

/// Summary of a completed walk.
#[derive(Debug, Default)]
pub struct WalkReport {
    /// Listings resolved (the root plus every directory descended into).
    pub listings: usize,
    /// Files accepted by the sink.
    pub files_written: usize,
    /// Files rejected by the selection policy.
    pub files_filtered: usize,
    /// Directories not descended into because of their name.
    pub excluded_dirs: usize,
    /// Symlinks and submodules.
    pub skipped: usize,
    pub failures: Vec<WalkFailure>,
}

impl WalkReport {
    /// True when no failure was collected.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn merge(&mut self, other: WalkReport) {
        self.listings += other.listings;
        self.files_written += other.files_written;
        self.files_filtered += other.files_filtered;
        self.excluded_dirs += other.excluded_dirs;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
    }
}

type ChildResult = (String, Result<WalkReport, WalkError>);

/// Reduce repository directories to a sorted set of disjoint walk roots.
///
/// Leading and trailing slashes are ignored, duplicates collapse, and a
/// directory nested under another listed directory is dropped. An empty
/// entry stands for the repository root and absorbs everything; an empty
/// input also yields the repository root.
pub fn disjoint_roots<S: AsRef<str>>(dirs: &[S]) -> Vec<String> {
    let mut roots: Vec<String> = dirs
        .iter()
        .map(|d| d.as_ref().trim_matches('/').to_string())
        .collect();
    if roots.is_empty() || roots.iter().any(|r| r.is_empty()) {
        return vec![String::new()];
    }

    roots.sort();
    roots.dedup();

    let mut kept: Vec<String> = Vec::with_capacity(roots.len());
    for root in roots {
        // Sorted order puts an ancestor before all of its descendants.
        let nested = kept
            .iter()
            .any(|k| root.starts_with(k.as_str()) && root[k.len()..].starts_with('/'));
        if !nested {
            kept.push(root);
        }
    }
    kept
}

/// Drives a walk over one content source.
pub struct TreeWalker<'a, S: ContentSource + ?Sized> {
    source: &'a S,
    options: WalkOptions,
}

impl<'a, S: ContentSource + ?Sized> TreeWalker<'a, S> {
    pub fn new(source: &'a S, options: WalkOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// Walk everything reachable from `root`, handing selected files to `sink`.
    ///
    /// # Errors
    ///
    /// Under `FailFast`, the first error any node produced. Under `Collect`,
    /// only a failure to list `root` itself.
    pub async fn walk(
        &self,
        root: impl Into<Target>,
        sink: &dyn FileSink,
    ) -> Result<WalkReport, WalkError> {
        self.walk_target(root.into(), sink).await
    }

    /// Walk several roots concurrently into one sink and sum their reports.
    ///
    /// Roots should be disjoint (see [`disjoint_roots`]) so that no file is
    /// handed to the sink twice. Every root is driven to completion before
    /// the first error is returned.
    pub async fn walk_all<T: Into<Target>>(
        &self,
        roots: impl IntoIterator<Item = T>,
        sink: &dyn FileSink,
    ) -> Result<WalkReport, WalkError> {
        let walks = roots.into_iter().map(|root| self.walk(root, sink));
        let results = future::join_all(walks).await;

        let mut report = WalkReport::default();
        let mut first_error = None;
        for result in results {
            match result {
                Ok(r) => report.merge(r),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(report),
        }
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.options.excluded_dirs.iter().any(|d| d == name)
    }

    fn selects(&self, path: &str) -> bool {
        match self.options.mode {
            WalkMode::All => true,
            WalkMode::Select(ref policy) => policy.matches(path),
        }
    }

    fn walk_target<'b>(
        &'b self,
        target: Target,
        sink: &'b dyn FileSink,
    ) -> BoxFuture<'b, Result<WalkReport, WalkError>> {
        async move {
            let listing = self.source.listing(&target).await?;
            log::debug!("listed {} ({} entries)", target, listing.len());

            let mut report = WalkReport {
                listings: 1,
                ..WalkReport::default()
            };
            let mut pending: FuturesUnordered<BoxFuture<'b, ChildResult>> =
                FuturesUnordered::new();

            for entry in listing.into_entries() {
                let path = entry.path.clone();
                match classify(&entry) {
                    Err(e) => {
                        let err = WalkError::Remote(e.into());
                        pending.push(future::ready((path, Err(err))).boxed());
                    }
                    Ok(Entry::File {
                        name,
                        path,
                        download_url,
                    }) => {
                        if !self.selects(&path) {
                            report.files_filtered += 1;
                            continue;
                        }
                        let file = RemoteFile {
                            name,
                            path,
                            download_url,
                        };
                        pending.push(
                            async move {
                                let result = sink.accept(&file).await.map(|()| WalkReport {
                                    files_written: 1,
                                    ..WalkReport::default()
                                });
                                (file.path, result)
                            }
                            .boxed(),
                        );
                    }
                    Ok(Entry::Directory {
                        name, listing_url, ..
                    }) => {
                        if self.is_excluded(&name) {
                            log::debug!("not descending into excluded directory {}", path);
                            report.excluded_dirs += 1;
                            continue;
                        }
                        let child = self.walk_target(Target::Reference(listing_url), sink);
                        pending.push(child.map(move |result| (path, result)).boxed());
                    }
                    Ok(Entry::Skipped { path, kind }) => {
                        log::debug!("skipping {} {}", kind, path);
                        report.skipped += 1;
                    }
                }
            }

            let mut first_error = None;
            while let Some((path, result)) = pending.next().await {
                match result {
                    Ok(child) => report.merge(child),
                    Err(error) => match self.options.failure_policy {
                        FailurePolicy::FailFast => {
                            if first_error.is_none() {
                                first_error = Some(error);
                            }
                        }
                        FailurePolicy::Collect => {
                            log::warn!("{}: {}", path, error);
                            report.failures.push(WalkFailure { path, error });
                        }
                    },
                }
            }

            match first_error {
                Some(error) => Err(error),
                None => Ok(report),
            }
        }
        .boxed()
    }
}
