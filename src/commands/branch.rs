//! Implementation of the `relbranch branch` command.

use super::setup::{RunSetup, resolve, review_service};
use crate::cli::BranchArgs;
use crate::config::StrategyKind;
use crate::error::Result;
use crate::orchestrator::{ApiCreator, BranchCreator, LocalGitCreator, Orchestrator};
use crate::process::{ProcessRunner, RetryPolicy, SystemExecutor};
use tracing::info;

/// Execute the `relbranch branch` command.
pub fn cmd_branch(args: &BranchArgs, noisy: bool) -> Result<()> {
    let setup = resolve(args)?;
    let runner = ProcessRunner::new(SystemExecutor, RetryPolicy::default(), setup.config.dry_run)
        .noisy(noisy);

    if setup.config.dry_run {
        info!("dry run: nothing will be pushed");
    }

    match setup.strategy {
        StrategyKind::Git => run(&setup, &runner, &LocalGitCreator::new(&runner)),
        StrategyKind::Api => {
            let service = review_service(&setup.manifest, setup.config.dry_run)?;
            run(&setup, &runner, &ApiCreator::new(&runner, &service))
        }
    }
}

fn run(setup: &RunSetup, runner: &ProcessRunner, creator: &dyn BranchCreator) -> Result<()> {
    let orchestrator = Orchestrator::new(
        setup.config.clone(),
        &setup.manifest,
        setup.style.as_ref(),
        runner,
        creator,
    );
    let summary = orchestrator.execute()?;
    println!("{}", summary);
    Ok(())
}
