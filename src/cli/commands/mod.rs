//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Builds the content source, walker and sink from flags and config
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! `fetch` and `deploy` are async because they involve network I/O. Their
//! sync entry points create a tokio runtime and block on the async body.

mod completion;
mod deploy;
mod fetch;
mod types;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use deploy::deploy;
pub use fetch::fetch;
pub use types::types;

use crate::cli::args::{Command, RepoArgs};
use crate::cli::Context;
use crate::core::config::Config;
use crate::core::types::RemoteLocation;
use crate::metadata::{RequestedComponent, SelectionPolicy};
use crate::remote::github::GitHubContents;
use crate::remote::{ContentSource, ThrottledSource};
use crate::walk::{FailurePolicy, WalkMode, WalkOptions};
use anyhow::{Context as _, Result};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Fetch {
            repo,
            source_dirs,
            metadata,
            output_dir,
            keep_going,
            dry_run,
        } => fetch::fetch(
            ctx,
            &repo,
            &source_dirs,
            &metadata,
            &output_dir,
            keep_going,
            dry_run,
        ),
        Command::Deploy {
            target_org,
            repo,
            source_dirs,
            metadata,
            wait,
            keep_staging,
        } => deploy::deploy(
            ctx,
            &target_org,
            &repo,
            &source_dirs,
            &metadata,
            wait,
            keep_staging,
        ),
        Command::Types { filter } => types::types(ctx, filter.as_deref()),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Build the content source: flags override config, which overrides
/// defaults.
fn content_source(ctx: &Context, config: &Config) -> Result<Box<dyn ContentSource>> {
    let api_base = ctx.api_base.as_deref().unwrap_or(config.api_base());
    let mut github = GitHubContents::with_api_base(ctx.token.clone(), api_base);
    if let Some(timeout) = config.timeout() {
        github = github
            .with_timeout(timeout)
            .context("Failed to configure HTTP client")?;
    }
    log::debug!(
        "using {} ({})",
        github.api_base(),
        if github.has_token() {
            "authenticated"
        } else {
            "anonymous"
        }
    );

    match ctx.max_concurrency.or(config.max_concurrency()) {
        Some(limit) => {
            log::debug!("limiting to {} requests in flight", limit);
            Ok(Box::new(ThrottledSource::new(github, limit)))
        }
        None => Ok(Box::new(github)),
    }
}

/// Locations for each walk root in the requested repository and revision.
fn root_locations(repo: &RepoArgs, roots: &[String]) -> Result<Vec<RemoteLocation>> {
    roots
        .iter()
        .map(|root| {
            RemoteLocation::new(&repo.repo_owner, &repo.repo_name, root)
                .map(|l| l.with_ref(repo.repo_ref.clone()))
                .context("Invalid repository")
        })
        .collect()
}

fn walk_options(
    config: &Config,
    components: Vec<RequestedComponent>,
    failure_policy: FailurePolicy,
) -> WalkOptions {
    let mode = if components.is_empty() {
        WalkMode::All
    } else {
        WalkMode::Select(SelectionPolicy::new(components))
    };
    WalkOptions::default()
        .with_mode(mode)
        .with_excluded_dirs(config.excluded_dirs())
        .with_failure_policy(failure_policy)
}

/// `owner/name` with `:ref` when pinned.
fn describe_repo(repo: &RepoArgs) -> String {
    match repo.repo_ref.as_deref().filter(|r| !r.is_empty()) {
        Some(r) => format!("{}/{}:{}", repo.repo_owner, repo.repo_name, r),
        None => format!("{}/{}", repo.repo_owner, repo.repo_name),
    }
}
