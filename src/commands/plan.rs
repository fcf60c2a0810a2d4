//! Implementation of the `relbranch plan` command.

use super::setup::{RunSetup, resolve};
use crate::cli::BranchArgs;
use crate::error::Result;
use crate::orchestrator::{SkipList, apply_resume_marker};
use std::fmt::Write;

/// Execute the `relbranch plan` command.
pub fn cmd_plan(args: &BranchArgs) -> Result<()> {
    let setup = resolve(args)?;
    let skip = apply_resume_marker(
        &setup.manifest.dependent_names(),
        setup.config.start_from.as_deref(),
    )?;
    print!("{}", render_plan(&setup, &skip));
    Ok(())
}

/// Human-readable description of the walk a run would perform.
pub(crate) fn render_plan(setup: &RunSetup, skip: &SkipList) -> String {
    let config = &setup.config;
    let manifest = &setup.manifest;
    let mut out = String::new();

    let _ = writeln!(out, "style:          {}", setup.style.short_name());
    let _ = writeln!(out, "strategy:       {}", setup.strategy.as_str());
    let _ = writeln!(out, "source branch:  {}", config.source_branch());
    let _ = writeln!(out, "new branch:     {}", config.new_branch());
    let _ = writeln!(
        out,
        "core:           {} -> {}",
        config.source_clone_path,
        config.core_dir().display()
    );
    if config.dry_run {
        let _ = writeln!(out, "mode:           dry run");
    }
    let _ = writeln!(out);

    let branches = manifest
        .repositories
        .iter()
        .map(|r| (r.name.as_str(), r.branch.as_str()))
        .chain(
            manifest
                .special_repositories
                .iter()
                .map(|s| (s.name.as_str(), s.branch.as_str())),
        );
    for (name, branch) in branches {
        let action = if skip.contains(name) { "skip  " } else { "branch" };
        let _ = writeln!(out, "{} {} (from {})", action, name, branch);
        for submodule in manifest.submodules_of(name) {
            let _ = writeln!(out, "         submodule {}", submodule);
        }
    }
    let _ = writeln!(out, "branch {} (from {})", manifest.core.name, config.source_branch());
    out
}
