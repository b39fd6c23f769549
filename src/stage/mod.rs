//! stage
//!
//! Local staging area for fetched source.
//!
//! # Layout
//!
//! A staging root is a temporary directory owned by one invocation:
//!
//! ```text
//! <tmp>/rdeploy-XXXXXX/
//!   sfdx-project.json      project descriptor
//!   src/                   mirrored repository paths
//! ```
//!
//! It is created before traversal starts and removed when dropped (or via
//! [`StagingRoot::close`]) once the deploy has finished or failed.
//! [`StagingRoot::keep`] persists it for inspection.
//!
//! # Modules
//!
//! - `materializer` - Path-safe file writes under a root
//! - `project` - The project descriptor
//! - `sink` - The walk sink that fetches and writes files

mod materializer;
mod project;
mod sink;

pub use materializer::Materializer;
pub use project::{
    PackageDirectory, ProjectDescriptor, DEFAULT_LOGIN_URL, DEFAULT_SOURCE_API_VERSION,
};
pub use sink::MirrorSink;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

/// Name of the project descriptor file.
pub const PROJECT_FILE: &str = "sfdx-project.json";

/// Subfolder of the staging root that mirrored files are written into.
pub const SOURCE_DIR: &str = "src";

/// Errors from staging operations.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("refusing to write outside the staging root: '{0}'")]
    UnsafePath(String),

    #[error("failed to serialize project descriptor: {0}")]
    Descriptor(String),
}

/// A temporary project directory for one deploy.
#[derive(Debug)]
pub struct StagingRoot {
    dir: TempDir,
}

impl StagingRoot {
    /// Create a staging root in the system temp directory.
    ///
    /// # Errors
    ///
    /// Returns `StageError::Io` if the directory or descriptor cannot be
    /// written.
    pub fn create(descriptor: &ProjectDescriptor) -> Result<Self, StageError> {
        Self::create_in(std::env::temp_dir(), descriptor)
    }

    /// Create a staging root under `parent`.
    pub fn create_in(
        parent: impl AsRef<Path>,
        descriptor: &ProjectDescriptor,
    ) -> Result<Self, StageError> {
        let parent = parent.as_ref();
        let dir = tempfile::Builder::new()
            .prefix("rdeploy-")
            .tempdir_in(parent)
            .map_err(|e| StageError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;

        let source_dir = dir.path().join(SOURCE_DIR);
        fs::create_dir_all(&source_dir).map_err(|e| StageError::Io {
            path: source_dir.clone(),
            source: e,
        })?;

        let contents = serde_json::to_string_pretty(descriptor)
            .map_err(|e| StageError::Descriptor(e.to_string()))?;
        let project_file = dir.path().join(PROJECT_FILE);
        fs::write(&project_file, contents).map_err(|e| StageError::Io {
            path: project_file,
            source: e,
        })?;

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory mirrored files are written into.
    pub fn source_dir(&self) -> PathBuf {
        self.dir.path().join(SOURCE_DIR)
    }

    /// A materializer rooted at [`source_dir`](Self::source_dir).
    pub fn materializer(&self) -> Materializer {
        Materializer::new(self.source_dir())
    }

    /// Path of a mirrored repository directory as the deploy tool sees it,
    /// relative to the staging root.
    pub fn deploy_path(repo_dir: &str) -> String {
        let repo_dir = repo_dir.trim_matches('/');
        if repo_dir.is_empty() {
            SOURCE_DIR.to_string()
        } else {
            format!("{}/{}", SOURCE_DIR, repo_dir)
        }
    }

    /// Remove the staging root, reporting any failure.
    pub fn close(self) -> Result<(), StageError> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| StageError::Io { path, source: e })
    }

    /// Keep the directory on disk and return its path.
    #[allow(deprecated)]
    pub fn keep(self) -> PathBuf {
        self.dir.into_path()
    }
}
