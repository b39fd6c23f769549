//! remote::mock
//!
//! In-memory content source for deterministic testing.
//!
//! # Design
//!
//! The mock holds a tree of files keyed by repository-relative path.
//! Directories are implied by file paths (or added explicitly when empty).
//! Listing and download addresses handed out in entries use the `mock://`
//! scheme and resolve back into the same tree, so a walk over the mock
//! exercises the same reference-following path as a walk over GitHub.
//!
//! Failures and delays can be attached to individual paths, and every
//! request is recorded along with the peak number of concurrent requests.
//!
//! # Example
//!
//! ```
//! use remote_deploy::remote::mock::MockContentSource;
//! use remote_deploy::remote::ContentSource;
//!
//! # tokio_test::block_on(async {
//! let source = MockContentSource::new();
//! source.add_file("force-app/classes/Foo.cls", b"public class Foo {}");
//!
//! let listing = source.listing(&source.location("force-app")).await.unwrap();
//! assert_eq!(listing.len(), 1);
//!
//! let bytes = source.raw(&source.raw_target("force-app/classes/Foo.cls")).await.unwrap();
//! assert_eq!(bytes, b"public class Foo {}");
//! # });
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::traits::{ContentSource, Payload, RemoteError, ResponseKind};
use crate::core::types::{ContentEntry, EntryKind, Listing, RemoteLocation, Target};

const LIST_PREFIX: &str = "mock://list/";
const RAW_PREFIX: &str = "mock://raw/";

/// Mock content source for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockContentSource {
    inner: Arc<Mutex<MockInner>>,
}

#[derive(Debug, Default)]
struct MockInner {
    files: BTreeMap<String, Vec<u8>>,
    /// Explicitly added directories (possibly empty).
    dirs: BTreeSet<String>,
    /// Entries reported with a non-file, non-dir kind.
    special: BTreeMap<String, EntryKind>,
    failures: HashMap<String, RemoteError>,
    delays: HashMap<String, Duration>,
    operations: Vec<MockOperation>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Recorded request for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Listing { path: String },
    Raw { path: String },
}

fn name_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}

impl MockContentSource {
    /// Create a new empty mock source.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add (or replace) a file.
    pub fn add_file(&self, path: &str, contents: &[u8]) {
        let path = path.trim_matches('/').to_string();
        self.state().files.insert(path, contents.to_vec());
    }

    /// Add a directory that may have no children.
    pub fn add_dir(&self, path: &str) {
        let path = path.trim_matches('/').to_string();
        self.state().dirs.insert(path);
    }

    /// Add a symlink or submodule entry.
    pub fn add_special(&self, path: &str, kind: EntryKind) {
        let path = path.trim_matches('/').to_string();
        self.state().special.insert(path, kind);
    }

    /// Make every request for `path` (listing or raw) fail with `error`.
    pub fn fail_on(&self, path: &str, error: RemoteError) {
        let path = path.trim_matches('/').to_string();
        self.state().failures.insert(path, error);
    }

    /// Delay every request for `path` by `delay`.
    pub fn delay(&self, path: &str, delay: Duration) {
        let path = path.trim_matches('/').to_string();
        self.state().delays.insert(path, delay);
    }

    /// A structured location into the mock tree.
    pub fn location(&self, path: &str) -> Target {
        // "mock" is a valid owner/repo pair, so this cannot fail.
        match RemoteLocation::new("mock", "repo", path) {
            Ok(location) => Target::Location(location),
            Err(_) => Target::Reference(format!("{}{}", LIST_PREFIX, path)),
        }
    }

    /// The listing reference handed out for a directory.
    pub fn listing_target(&self, path: &str) -> Target {
        Target::Reference(format!("{}{}", LIST_PREFIX, path.trim_matches('/')))
    }

    /// The download reference handed out for a file.
    pub fn raw_target(&self, path: &str) -> Target {
        Target::Reference(format!("{}{}", RAW_PREFIX, path.trim_matches('/')))
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.state().operations.clone()
    }

    /// Paths for which raw content was requested, sorted.
    pub fn raw_requests(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .state()
            .operations
            .iter()
            .filter_map(|op| match op {
                MockOperation::Raw { path } => Some(path.clone()),
                MockOperation::Listing { .. } => None,
            })
            .collect();
        paths.sort();
        paths
    }

    /// Paths whose listing was requested, sorted.
    pub fn listing_requests(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .state()
            .operations
            .iter()
            .filter_map(|op| match op {
                MockOperation::Listing { path } => Some(path.clone()),
                MockOperation::Raw { .. } => None,
            })
            .collect();
        paths.sort();
        paths
    }

    /// Highest number of requests observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.state().max_in_flight
    }

    fn resolve_path(target: &Target) -> Result<String, RemoteError> {
        match target {
            Target::Location(location) => Ok(location.path().to_string()),
            Target::Reference(uri) => uri
                .strip_prefix(LIST_PREFIX)
                .or_else(|| uri.strip_prefix(RAW_PREFIX))
                .map(|p| p.trim_matches('/').to_string())
                .ok_or_else(|| RemoteError::NotFound(uri.clone())),
        }
    }

    fn is_dir(inner: &MockInner, path: &str) -> bool {
        if path.is_empty() || inner.dirs.contains(path) {
            return true;
        }
        let prefix = format!("{}/", path);
        inner.files.keys().any(|f| f.starts_with(&prefix))
            || inner.dirs.iter().any(|d| d.starts_with(&prefix))
            || inner.special.keys().any(|s| s.starts_with(&prefix))
    }

    fn file_entry(&self, path: &str) -> ContentEntry {
        ContentEntry {
            name: name_of(path).to_string(),
            path: path.to_string(),
            kind: EntryKind::File,
            download_url: Some(format!("{}{}", RAW_PREFIX, path)),
            url: Some(format!("{}{}", LIST_PREFIX, path)),
        }
    }

    fn dir_entry(&self, path: &str) -> ContentEntry {
        ContentEntry {
            name: name_of(path).to_string(),
            path: path.to_string(),
            kind: EntryKind::Dir,
            download_url: None,
            url: Some(format!("{}{}", LIST_PREFIX, path)),
        }
    }

    fn children(&self, inner: &MockInner, dir: &str) -> Vec<ContentEntry> {
        let mut child_dirs = BTreeSet::new();
        let mut child_files = Vec::new();
        let mut child_special = Vec::new();

        let all_paths = inner
            .files
            .keys()
            .chain(inner.dirs.iter())
            .chain(inner.special.keys());
        for path in all_paths {
            let rest = if dir.is_empty() {
                Some(path.as_str())
            } else {
                path.strip_prefix(dir).and_then(|r| r.strip_prefix('/'))
            };
            let Some(rest) = rest.filter(|r| !r.is_empty()) else {
                continue;
            };
            let child = match rest.split_once('/') {
                Some((first, _)) => {
                    let child_path = join(dir, first);
                    child_dirs.insert(child_path);
                    continue;
                }
                None => join(dir, rest),
            };
            if inner.files.contains_key(&child) {
                child_files.push(self.file_entry(&child));
            } else if let Some(kind) = inner.special.get(&child) {
                child_special.push(ContentEntry {
                    name: name_of(&child).to_string(),
                    path: child.clone(),
                    kind: *kind,
                    download_url: None,
                    url: Some(format!("{}{}", LIST_PREFIX, child)),
                });
            } else {
                child_dirs.insert(child);
            }
        }

        let mut entries: Vec<ContentEntry> =
            child_dirs.iter().map(|d| self.dir_entry(d)).collect();
        entries.extend(child_files);
        entries.extend(child_special);
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    fn respond(&self, path: &str, kind: ResponseKind) -> Result<Payload, RemoteError> {
        let inner = self.state();
        if let Some(err) = inner.failures.get(path) {
            return Err(err.clone());
        }

        match kind {
            ResponseKind::Raw => inner
                .files
                .get(path)
                .cloned()
                .map(Payload::Raw)
                .ok_or_else(|| RemoteError::NotFound(format!("{}{}", RAW_PREFIX, path))),
            ResponseKind::Listing => {
                if inner.files.contains_key(path) {
                    Ok(Payload::Listing(Listing::Single(self.file_entry(path))))
                } else if Self::is_dir(&inner, path) {
                    Ok(Payload::Listing(Listing::Many(self.children(&inner, path))))
                } else {
                    Err(RemoteError::NotFound(format!("{}{}", LIST_PREFIX, path)))
                }
            }
        }
    }
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

#[async_trait]
impl ContentSource for MockContentSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch(&self, target: &Target, kind: ResponseKind) -> Result<Payload, RemoteError> {
        let path = Self::resolve_path(target)?;

        let delay = {
            let mut inner = self.state();
            inner.operations.push(match kind {
                ResponseKind::Listing => MockOperation::Listing { path: path.clone() },
                ResponseKind::Raw => MockOperation::Raw { path: path.clone() },
            });
            inner.in_flight += 1;
            inner.max_in_flight = inner.max_in_flight.max(inner.in_flight);
            inner.delays.get(&path).copied()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = self.respond(&path, kind);
        self.state().in_flight -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(listing: Listing) -> Vec<String> {
        listing.into_entries().into_iter().map(|e| e.name).collect()
    }

    #[test]
    fn name_is_last_segment() {
        assert_eq!(name_of("a/b/c.txt"), "c.txt");
        assert_eq!(name_of("c.txt"), "c.txt");
    }

    #[tokio::test]
    async fn root_lists_immediate_children() {
        let source = MockContentSource::new();
        source.add_file("a.txt", b"a");
        source.add_file("sub/b.txt", b"b");
        source.add_file("sub/deeper/c.txt", b"c");

        let listing = source.listing(&source.location("")).await.unwrap();
        assert_eq!(names(listing), vec!["a.txt", "sub"]);

        let listing = source.listing(&source.listing_target("sub")).await.unwrap();
        assert_eq!(names(listing), vec!["b.txt", "deeper"]);
    }

    #[tokio::test]
    async fn file_location_lists_single_entry() {
        let source = MockContentSource::new();
        source.add_file("dir/a.txt", b"a");

        let listing = source.listing(&source.location("dir/a.txt")).await.unwrap();
        assert!(matches!(listing, Listing::Single(ref e) if e.path == "dir/a.txt"));
    }

    #[tokio::test]
    async fn empty_dir_lists_nothing() {
        let source = MockContentSource::new();
        source.add_dir("empty");

        let listing = source.listing(&source.location("empty")).await.unwrap();
        assert!(listing.is_empty());
    }

    #[tokio::test]
    async fn missing_path_is_not_found() {
        let source = MockContentSource::new();
        let result = source.listing(&source.location("nope")).await;
        assert!(matches!(result, Err(RemoteError::NotFound(_))));

        let result = source.raw(&source.raw_target("nope.txt")).await;
        assert!(matches!(result, Err(RemoteError::NotFound(_))));
    }

    #[tokio::test]
    async fn fail_on_applies_to_path() {
        let source = MockContentSource::new();
        source.add_file("a.txt", b"a");
        source.fail_on(
            "a.txt",
            RemoteError::Api {
                status: 500,
                message: "boom".into(),
            },
        );

        let result = source.raw(&source.raw_target("a.txt")).await;
        assert_eq!(
            result,
            Err(RemoteError::Api {
                status: 500,
                message: "boom".into()
            })
        );
    }

    #[tokio::test]
    async fn records_operations() {
        let source = MockContentSource::new();
        source.add_file("a.txt", b"a");

        source.listing(&source.location("")).await.unwrap();
        source.raw(&source.raw_target("a.txt")).await.unwrap();

        assert_eq!(
            source.operations(),
            vec![
                MockOperation::Listing {
                    path: String::new()
                },
                MockOperation::Raw {
                    path: "a.txt".into()
                },
            ]
        );
        assert_eq!(source.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn special_entries_are_listed_with_their_kind() {
        let source = MockContentSource::new();
        source.add_special("vendor/lib", EntryKind::Submodule);

        let listing = source.listing(&source.location("vendor")).await.unwrap();
        let entries = listing.into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, EntryKind::Submodule);
    }
}
