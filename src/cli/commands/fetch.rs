//! fetch command - Mirror repository files into a local directory

use std::path::Path;

use super::{content_source, describe_repo, root_locations, walk_options};
use crate::cli::args::RepoArgs;
use crate::cli::Context;
use crate::core::config::Config;
use crate::metadata::parse_all;
use crate::stage::{Materializer, MirrorSink};
use crate::ui::output;
use crate::walk::{disjoint_roots, FailurePolicy, FileSink, RecordingSink, TreeWalker};
use anyhow::{bail, Context as _, Result};

/// Mirror repository files into `output_dir`.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `repo` - Repository and revision to read
/// * `source_dirs` - Repository directories to walk; empty means the root
/// * `metadata` - `Type:Name` selectors; non-empty enables filtering
/// * `output_dir` - Local directory to write into
/// * `keep_going` - Collect failures instead of stopping at the first one
/// * `dry_run` - Only list what would be written
pub fn fetch(
    ctx: &Context,
    repo: &RepoArgs,
    source_dirs: &[String],
    metadata: &[String],
    output_dir: &Path,
    keep_going: bool,
    dry_run: bool,
) -> Result<()> {
    // Selectors are checked before any network traffic.
    let components = parse_all(metadata)?;
    let config = Config::load().context("Failed to load configuration")?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let verbosity = ctx.verbosity();
        let source = content_source(ctx, &config)?;
        let roots = disjoint_roots(source_dirs);
        let locations = root_locations(repo, &roots)?;

        let policy = if keep_going {
            FailurePolicy::Collect
        } else {
            FailurePolicy::FailFast
        };
        let walker = TreeWalker::new(&*source, walk_options(&config, components, policy));

        output::progress(
            format!("Downloading source from {}", describe_repo(repo)),
            verbosity,
        );

        let recording = RecordingSink::new();
        let mirror = MirrorSink::new(&*source, Materializer::new(output_dir));
        let sink: &dyn FileSink = if dry_run { &recording } else { &mirror };

        let report = walker
            .walk_all(locations, sink)
            .await
            .with_context(|| format!("Failed to fetch from {}", describe_repo(repo)))?;

        output::debug(
            format!(
                "{} listings, {} filtered, {} excluded dirs, {} skipped",
                report.listings, report.files_filtered, report.excluded_dirs, report.skipped
            ),
            verbosity,
        );

        if dry_run {
            for path in recording.paths() {
                output::print(&path, verbosity);
            }
            output::progress(
                format!("{} would be written", output::count(report.files_written, "file")),
                verbosity,
            );
        } else {
            output::success(
                format!(
                    "Fetched {} into {}",
                    output::count(report.files_written, "file"),
                    output_dir.display()
                ),
                verbosity,
            );
        }

        if !report.is_complete() {
            for failure in &report.failures {
                output::warn(format!("{}: {}", failure.path, failure.error), verbosity);
            }
            bail!(
                "{} could not be fetched",
                output::count(report.failures.len(), "path")
            );
        }

        Ok(())
    })
}
