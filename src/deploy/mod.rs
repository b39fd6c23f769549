//! deploy
//!
//! Boundary to the tool that pushes a staged project to an org.
//!
//! The crate never speaks the deploy protocol itself. A [`Deployer`]
//! receives a populated staging root together with the target org and
//! either source directories or metadata selectors, and reports the
//! outcome. [`SfCliDeployer`] is the production implementation and runs
//! the `sf` command-line tool.

mod sf_cli;

pub use sf_cli::{is_benign_tracking_error, SfCliDeployer, DEFAULT_SF_BIN};

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::metadata::RequestedComponent;

/// Errors from a deploy.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("failed to run '{bin}': {source}")]
    Spawn {
        bin: String,
        source: std::io::Error,
    },

    #[error("deploy failed (exit code {code:?}): {message}")]
    Failed { code: Option<i32>, message: String },
}

/// What to deploy out of the staging root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployTarget {
    /// Paths relative to the staging root, e.g. `src/force-app`.
    SourceDirs(Vec<String>),
    /// Individual components.
    Metadata(Vec<RequestedComponent>),
}

impl DeployTarget {
    pub fn is_empty(&self) -> bool {
        match self {
            DeployTarget::SourceDirs(dirs) => dirs.is_empty(),
            DeployTarget::Metadata(components) => components.is_empty(),
        }
    }
}

/// A request to deploy a staged project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub project_dir: PathBuf,
    pub target_org: String,
    pub target: DeployTarget,
    /// Minutes to wait for completion; `None` uses the tool's default.
    pub wait_minutes: Option<u32>,
}

/// Result of a deploy that did not fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOutcome {
    pub id: Option<String>,
    pub status: Option<String>,
    /// The deploy succeeded but the post-deploy tracking update failed.
    pub tracking_warning: bool,
}

impl fmt::Display for DeployOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.id, &self.status) {
            (Some(id), Some(status)) => write!(f, "{} ({})", id, status),
            (Some(id), None) => write!(f, "{}", id),
            (None, Some(status)) => write!(f, "{}", status),
            (None, None) => write!(f, "completed"),
        }
    }
}

/// Something that can deploy a staging root.
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Name of this deployer for logging.
    fn name(&self) -> &'static str;

    /// Deploy the staged project.
    ///
    /// # Errors
    ///
    /// Returns `DeployError::Spawn` if the deploy tool cannot be started and
    /// `DeployError::Failed` if it reports failure. A benign tracking failure
    /// is not an error; it sets `DeployOutcome::tracking_warning`.
    async fn deploy(&self, request: &DeployRequest) -> Result<DeployOutcome, DeployError>;
}
