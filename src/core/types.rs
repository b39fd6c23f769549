//! core::types
//!
//! Strong types for addressing and describing remote repository content.
//!
//! # Types
//!
//! - [`RemoteLocation`] - Validated `owner/repo/path[@ref]` address
//! - [`Target`] - Either a structured location or a pre-resolved reference
//! - [`ContentEntry`] - One decoded record of a contents listing
//! - [`Listing`] - A single entry or an ordered sequence of entries
//! - [`Entry`] - A classified entry (file, directory, or skipped)
//!
//! # Validation
//!
//! Locations are validated at construction time, and listing entries carry
//! a required `type` discriminant that is checked while decoding. An entry
//! that decodes can always be classified without guessing from field
//! presence.
//!
//! # Examples
//!
//! ```
//! use remote_deploy::core::types::{classify, ContentEntry, Entry, EntryKind, RemoteLocation};
//!
//! let location = RemoteLocation::new("octocat", "hello-world", "/force-app/").unwrap();
//! assert_eq!(location.path(), "force-app");
//!
//! let entry = ContentEntry {
//!     name: "Foo.cls".to_string(),
//!     path: "force-app/classes/Foo.cls".to_string(),
//!     kind: EntryKind::File,
//!     download_url: Some("https://raw.example.com/Foo.cls".to_string()),
//!     url: None,
//! };
//! assert!(matches!(classify(&entry), Ok(Entry::File { .. })));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid remote location: {0}")]
    InvalidLocation(String),

    #[error("malformed content entry: {0}")]
    MalformedEntry(String),
}

/// A structured address of one node in a remote repository tree.
///
/// The `path` is stored without leading or trailing slashes; an empty path
/// addresses the repository root. When `git_ref` is `None` the remote's
/// default branch is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteLocation {
    owner: String,
    repo: String,
    path: String,
    git_ref: Option<String>,
}

impl RemoteLocation {
    /// Create a new location at the default revision.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidLocation` if owner or repo is empty or
    /// contains a `/`.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        path: impl AsRef<str>,
    ) -> Result<Self, TypeError> {
        let owner = owner.into();
        let repo = repo.into();

        for (label, value) in [("owner", &owner), ("repo", &repo)] {
            if value.trim().is_empty() {
                return Err(TypeError::InvalidLocation(format!(
                    "{} cannot be empty",
                    label
                )));
            }
            if value.contains('/') {
                return Err(TypeError::InvalidLocation(format!(
                    "{} '{}' cannot contain '/'",
                    label, value
                )));
            }
        }

        Ok(Self {
            owner,
            repo,
            path: path.as_ref().trim_matches('/').to_string(),
            git_ref: None,
        })
    }

    /// Pin the location to a branch, tag, or commit.
    ///
    /// Empty refs are ignored so that an unset CLI flag and an empty one
    /// behave the same.
    pub fn with_ref(mut self, git_ref: Option<impl Into<String>>) -> Self {
        self.git_ref = git_ref.map(Into::into).filter(|r| !r.is_empty());
        self
    }

    /// Return a location for a different path in the same repository and revision.
    pub fn at_path(&self, path: impl AsRef<str>) -> Self {
        Self {
            path: path.as_ref().trim_matches('/').to_string(),
            ..self.clone()
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Repository-relative path, empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn git_ref(&self) -> Option<&str> {
        self.git_ref.as_deref()
    }
}

impl std::fmt::Display for RemoteLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)?;
        if let Some(ref r) = self.git_ref {
            write!(f, ":{}", r)?;
        }
        if !self.path.is_empty() {
            write!(f, " ({})", self.path)?;
        }
        Ok(())
    }
}

/// What a content request is addressed at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Structured `owner/repo/path[?ref]` address.
    Location(RemoteLocation),
    /// Opaque URI handed out by the API (listing or download address).
    Reference(String),
}

impl From<RemoteLocation> for Target {
    fn from(location: RemoteLocation) -> Self {
        Target::Location(location)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Location(location) => write!(f, "{}", location),
            Target::Reference(uri) => write!(f, "{}", uri),
        }
    }
}

/// Discriminant of a listing entry, as reported by the contents API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Dir => write!(f, "dir"),
            EntryKind::Symlink => write!(f, "symlink"),
            EntryKind::Submodule => write!(f, "submodule"),
        }
    }
}

/// One decoded record of a contents listing.
///
/// `type` is required: a record without it does not decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Raw download address, present for files.
    #[serde(default)]
    pub download_url: Option<String>,
    /// API address of the entry; for directories this is the nested listing.
    #[serde(default)]
    pub url: Option<String>,
}

/// A decoded listing response.
///
/// A path naming a file yields one entry, a path naming a directory yields
/// the ordered sequence of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Single(ContentEntry),
    Many(Vec<ContentEntry>),
}

impl Listing {
    /// Decode a listing, discriminating on the JSON shape.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::MalformedEntry` if the document is neither an
    /// object nor an array, or if any entry fails to decode.
    pub fn from_json(value: serde_json::Value) -> Result<Self, TypeError> {
        match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(decode_entry)
                .collect::<Result<Vec<_>, _>>()
                .map(Listing::Many),
            value @ serde_json::Value::Object(_) => decode_entry(value).map(Listing::Single),
            other => Err(TypeError::MalformedEntry(format!(
                "expected an object or array, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Flatten into the set of children to process.
    pub fn into_entries(self) -> Vec<ContentEntry> {
        match self {
            Listing::Single(entry) => vec![entry],
            Listing::Many(entries) => entries,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Listing::Single(_) => 1,
            Listing::Many(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn decode_entry(value: serde_json::Value) -> Result<ContentEntry, TypeError> {
    serde_json::from_value(value).map_err(|e| TypeError::MalformedEntry(e.to_string()))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// A classified listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File {
        name: String,
        path: String,
        download_url: String,
    },
    Directory {
        name: String,
        path: String,
        listing_url: String,
    },
    /// Symlinks and submodules carry nothing to mirror.
    Skipped { path: String, kind: EntryKind },
}

/// Classify a decoded entry.
///
/// # Errors
///
/// Returns `TypeError::MalformedEntry` if a file has no download address or
/// a directory has no listing address.
pub fn classify(entry: &ContentEntry) -> Result<Entry, TypeError> {
    match entry.kind {
        EntryKind::File => match entry.download_url {
            Some(ref url) => Ok(Entry::File {
                name: entry.name.clone(),
                path: entry.path.clone(),
                download_url: url.clone(),
            }),
            None => Err(TypeError::MalformedEntry(format!(
                "file '{}' has no download address",
                entry.path
            ))),
        },
        EntryKind::Dir => match entry.url {
            Some(ref url) => Ok(Entry::Directory {
                name: entry.name.clone(),
                path: entry.path.clone(),
                listing_url: url.clone(),
            }),
            None => Err(TypeError::MalformedEntry(format!(
                "directory '{}' has no listing address",
                entry.path
            ))),
        },
        kind @ (EntryKind::Symlink | EntryKind::Submodule) => Ok(Entry::Skipped {
            path: entry.path.clone(),
            kind,
        }),
    }
}
