//! Branch creation strategies.
//!
//! A run picks one strategy up front. Both answer the same two questions for
//! a repository: does the remote already have the new branch, and how is it
//! created from a base reference.

use crate::error::Result;
use crate::git::{Mutator, Probe};
use crate::process::ProcessRunner;
use crate::remote::BranchService;
use std::path::Path;
use tracing::info;

/// A repository checkout that is about to get the new branch.
#[derive(Debug, Clone, Copy)]
pub struct RepoTarget<'a> {
    /// Project name on the review server, e.g. `mediawiki/core`.
    pub project: &'a str,
    /// Local checkout.
    pub dir: &'a Path,
    /// Remote the checkout pushes to.
    pub remote_url: &'a str,
    /// Branch the checkout was cloned at, or `HEAD` for a pinned submodule.
    pub source_branch: &'a str,
    /// Branch being created.
    pub new_branch: &'a str,
}

pub trait BranchCreator {
    fn name(&self) -> &'static str;

    /// Whether the remote already has `target.new_branch`.
    fn has_remote_branch(&self, target: &RepoTarget<'_>) -> Result<bool>;

    /// Create `target.new_branch` from `base`, leave it checked out, and
    /// report whether it still has to be pushed.
    fn create_from_base(&self, target: &RepoTarget<'_>, base: &str) -> Result<NeedsPush>;
}

/// Whether a freshly created branch exists only locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeedsPush {
    Yes,
    No,
}

/// Local git plumbing: `ls-remote` to probe, `checkout -b` to create.
pub struct LocalGitCreator<'a> {
    runner: &'a ProcessRunner,
}

impl<'a> LocalGitCreator<'a> {
    pub fn new(runner: &'a ProcessRunner) -> Self {
        Self { runner }
    }
}

impl BranchCreator for LocalGitCreator<'_> {
    fn name(&self) -> &'static str {
        "git"
    }

    fn has_remote_branch(&self, target: &RepoTarget<'_>) -> Result<bool> {
        Probe::new(self.runner).remote_has_branch(target.dir, target.remote_url, target.new_branch)
    }

    fn create_from_base(&self, target: &RepoTarget<'_>, base: &str) -> Result<NeedsPush> {
        Mutator::new(self.runner).checkout_new(target.dir, target.new_branch, base)?;
        Ok(NeedsPush::Yes)
    }
}

/// Review-server REST calls; the local checkout then tracks the new branch.
///
/// In dry-run mode the server is never asked to create anything. The branch
/// is created locally instead so the rest of the run can proceed.
pub struct ApiCreator<'a> {
    runner: &'a ProcessRunner,
    service: &'a dyn BranchService,
}

impl<'a> ApiCreator<'a> {
    pub fn new(runner: &'a ProcessRunner, service: &'a dyn BranchService) -> Self {
        Self { runner, service }
    }
}

impl BranchCreator for ApiCreator<'_> {
    fn name(&self) -> &'static str {
        "api"
    }

    fn has_remote_branch(&self, target: &RepoTarget<'_>) -> Result<bool> {
        self.service.has_branch(target.project, target.new_branch)
    }

    fn create_from_base(&self, target: &RepoTarget<'_>, base: &str) -> Result<NeedsPush> {
        let mutator = Mutator::new(self.runner);

        if self.runner.is_dry_run() {
            info!(
                "[dry-run] would create {} in {} from {} on the review server",
                target.new_branch, target.project, target.source_branch
            );
            mutator.checkout_new(target.dir, target.new_branch, base)?;
            return Ok(NeedsPush::No);
        }

        // The server cannot resolve a local HEAD; send the commit id instead.
        let revision = if target.source_branch == "HEAD" {
            Probe::new(self.runner).head_revision(target.dir)?
        } else {
            target.source_branch.to_string()
        };
        let created = self
            .service
            .create_branch(target.project, &revision, target.new_branch)?;
        info!("created {} at {}", created.reference, created.revision);
        mutator.track_remote_branch(target.dir, target.new_branch)?;
        Ok(NeedsPush::No)
    }
}

/// Project name of a remote URL relative to `repo_path`.
///
/// `https://host/r/mediawiki/extensions/Cite` under `https://host/r` is
/// `mediawiki/extensions/Cite`; a URL outside `repo_path` keeps its path.
pub fn project_name(repo_path: &str, remote_url: &str) -> String {
    let base = repo_path.trim_end_matches('/');
    let host_relative = |url: &str| -> String {
        match url.split_once("://") {
            Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or("").to_string(),
            None => url.to_string(),
        }
    };

    let name = match remote_url.strip_prefix(base) {
        Some(rest) if rest.starts_with('/') => {
            let prefix = host_relative(base);
            let rest = rest.trim_start_matches('/');
            if prefix.is_empty() {
                rest.to_string()
            } else {
                format!("{}/{}", prefix.trim_end_matches('/'), rest)
            }
        }
        _ => host_relative(remote_url),
    };
    strip_gerrit_path(name.trim_end_matches(".git"))
}

/// Gerrit serves repositories under `/r/`; project names do not include it.
fn strip_gerrit_path(path: &str) -> String {
    path.strip_prefix("r/").unwrap_or(path).to_string()
}
