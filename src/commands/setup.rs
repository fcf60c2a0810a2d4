//! Assembling a run from arguments, branch style and manifest.

use crate::cli::{BranchArgs, StrategyArg};
use crate::config::{Manifest, RunConfig, StrategyKind};
use crate::error::{BranchError, Result};
use crate::remote::GerritBranchService;
use crate::style::{BranchStyle, StyleOptions, create_style};
use tracing::debug;

/// Everything a command needs, resolved once.
pub(crate) struct RunSetup {
    pub style: Box<dyn BranchStyle>,
    pub manifest: Manifest,
    pub config: RunConfig,
    pub strategy: StrategyKind,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Git => StrategyKind::Git,
            StrategyArg::Api => StrategyKind::Api,
        }
    }
}

/// Resolve the style, load the manifest and build the [`RunConfig`].
///
/// Command-line values win over the manifest, which wins over the style.
pub(crate) fn resolve(args: &BranchArgs) -> Result<RunSetup> {
    if args.new_version.trim().is_empty() {
        return Err(BranchError::UserError("--new must not be empty".to_string()));
    }

    let opts = StyleOptions {
        work_dir: args.work_dir.clone(),
        review_host: args.review_host.clone(),
        release_branch: args.release_branch.clone(),
    };
    let style = create_style(&args.style, &opts)?;

    let manifest_path = match &args.manifest {
        Some(path) => path.clone(),
        None => {
            let cwd = std::env::current_dir().map_err(|e| {
                BranchError::Io(format!("failed to determine current directory: {}", e))
            })?;
            style.manifest_path(&cwd)
        }
    };
    debug!("loading manifest {}", manifest_path.display());
    let manifest = Manifest::load(&manifest_path)?;

    let repo_path = manifest
        .repo_path
        .clone()
        .unwrap_or_else(|| style.source_path());
    let source_clone_path = args
        .path
        .clone()
        .unwrap_or_else(|| format!("{}/{}", repo_path.trim_end_matches('/'), manifest.core.name));

    let config = RunConfig {
        old_version: args.old_version.clone(),
        branch_prefix: args
            .branch_prefix
            .clone()
            .unwrap_or_else(|| style.branch_prefix().to_string()),
        new_version: args.new_version.clone(),
        repo_path,
        source_clone_path,
        branch_from: args.branch_from.clone(),
        dry_run: args.dry_run,
        start_from: args.continue_from.clone().filter(|s| !s.trim().is_empty()),
        work_dir: style.work_dir(),
        branch_dir: style.branch_dir()?,
    };

    let strategy = args.strategy.map(StrategyKind::from).unwrap_or(manifest.strategy);

    Ok(RunSetup {
        style,
        manifest,
        config,
        strategy,
    })
}

/// Build the review-server client for the API strategy.
///
/// The password is read from the environment variable the manifest names.
/// In dry-run mode the client is read-only.
pub(crate) fn review_service(manifest: &Manifest, dry_run: bool) -> Result<GerritBranchService> {
    let server = manifest
        .review_server
        .as_ref()
        .filter(|s| !s.url.trim().is_empty())
        .ok_or_else(|| {
            BranchError::Unconfigured(
                "the api strategy needs review_server.url in the manifest".to_string(),
            )
        })?;

    let mut service = GerritBranchService::new(dry_run);
    service.configure(&server.url)?;

    if let Some(username) = &server.username {
        let var = server.password_env.as_deref().ok_or_else(|| {
            BranchError::Unconfigured(format!(
                "review_server.password_env is required with username '{}'",
                username
            ))
        })?;
        let password = std::env::var(var).map_err(|_| {
            BranchError::Unconfigured(format!("environment variable {} is not set", var))
        })?;
        service = service.with_credentials(username.clone(), password);
    }

    Ok(service)
}
