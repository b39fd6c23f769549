//! deploy command - Stage repository source and deploy it to an org

use super::{content_source, describe_repo, root_locations, walk_options};
use crate::cli::args::RepoArgs;
use crate::cli::Context;
use crate::core::config::Config;
use crate::core::types::RemoteLocation;
use crate::deploy::{DeployOutcome, DeployRequest, DeployTarget, Deployer, SfCliDeployer};
use crate::metadata::{parse_all, RequestedComponent};
use crate::remote::ContentSource;
use crate::stage::{MirrorSink, ProjectDescriptor, StagingRoot, SOURCE_DIR};
use crate::ui::output;
use crate::walk::{disjoint_roots, FailurePolicy, TreeWalker};
use anyhow::{bail, Context as _, Result};

/// Stage the requested source and deploy it.
///
/// With `metadata` selectors the listed components are deployed and the
/// walk covers `source_dirs` (or the whole repository when none are given).
/// Otherwise each source directory is deployed as a whole.
pub fn deploy(
    ctx: &Context,
    target_org: &str,
    repo: &RepoArgs,
    source_dirs: &[String],
    metadata: &[String],
    wait: Option<u32>,
    keep_staging: bool,
) -> Result<()> {
    let components = parse_all(metadata)?;
    if components.is_empty() && source_dirs.is_empty() {
        bail!("Nothing to deploy: pass --source-dir or --metadata");
    }
    let config = Config::load().context("Failed to load configuration")?;
    let verbosity = ctx.verbosity();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let source = content_source(ctx, &config)?;
        let roots = disjoint_roots(source_dirs);
        let locations = root_locations(repo, &roots)?;

        let descriptor = ProjectDescriptor::new(SOURCE_DIR)
            .with_api_version(config.source_api_version())
            .with_login_url(config.login_url());
        let staging =
            StagingRoot::create(&descriptor).context("Failed to create staging directory")?;
        output::debug(
            format!("staging in {}", staging.path().display()),
            verbosity,
        );

        let result = stage_and_deploy(
            ctx,
            &staging,
            &*source,
            locations,
            &roots,
            components,
            &config,
            target_org,
            repo,
            wait,
        )
        .await;

        // Whether the walk, the match or the deploy failed, the staging root
        // is kept or removed the same way.
        if keep_staging || config.keep_staging() {
            let kept = staging.keep();
            output::print(
                format!("Staging directory kept at {}", kept.display()),
                verbosity,
            );
        } else if let Err(e) = staging.close() {
            output::warn(
                format!("Failed to remove staging directory: {}", e),
                verbosity,
            );
        }

        let outcome = result?;
        if outcome.tracking_warning {
            output::warn(
                "Deploy succeeded but local source tracking could not be updated",
                verbosity,
            );
        }
        output::success(format!("Deployed {}", outcome), verbosity);
        Ok(())
    })
}

/// Walk the repository into `staging` and deploy what landed there.
#[allow(clippy::too_many_arguments)]
async fn stage_and_deploy(
    ctx: &Context,
    staging: &StagingRoot,
    source: &dyn ContentSource,
    locations: Vec<RemoteLocation>,
    roots: &[String],
    components: Vec<RequestedComponent>,
    config: &Config,
    target_org: &str,
    repo: &RepoArgs,
    wait: Option<u32>,
) -> Result<DeployOutcome> {
    let verbosity = ctx.verbosity();

    output::progress(
        format!("Downloading source from {}", describe_repo(repo)),
        verbosity,
    );
    let walker = TreeWalker::new(
        source,
        walk_options(config, components.clone(), FailurePolicy::FailFast),
    );
    let sink = MirrorSink::new(source, staging.materializer());
    let report = walker
        .walk_all(locations, &sink)
        .await
        .with_context(|| format!("Failed to fetch from {}", describe_repo(repo)))?;

    if report.files_written == 0 {
        bail!("Nothing to deploy: no files matched in {}", describe_repo(repo));
    }
    output::progress(
        format!("Staged {}", output::count(report.files_written, "file")),
        verbosity,
    );

    let target = if components.is_empty() {
        DeployTarget::SourceDirs(roots.iter().map(|r| StagingRoot::deploy_path(r)).collect())
    } else {
        DeployTarget::Metadata(components)
    };
    let request = DeployRequest {
        project_dir: staging.path().to_path_buf(),
        target_org: target_org.to_string(),
        target,
        wait_minutes: wait,
    };

    let deployer = SfCliDeployer::with_bin(config.sf_bin());
    output::progress(format!("Deploying to {}", target_org), verbosity);
    deployer
        .deploy(&request)
        .await
        .with_context(|| format!("Deploy to '{}' failed", target_org))
}
