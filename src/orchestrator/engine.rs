//! The branching run: dependent repositories first, then the core.

use super::decision::{BranchDecision, ProbeFacts, decide};
use super::resume::{SkipList, apply_resume_marker};
use super::strategy::{BranchCreator, NeedsPush, RepoTarget, project_name};
use super::version::{VersionUpdate, fix_version};
use crate::config::{Manifest, RunConfig};
use crate::error::{BranchError, Result};
use crate::git::{Mutator, ORIGIN, Probe};
use crate::process::{DirStack, ProcessRunner};
use crate::style::BranchStyle;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Repositories left alone because of the resume marker.
    pub skipped: Vec<String>,
    /// Repositories that got the new branch (or already had it).
    pub branched: Vec<String>,
    /// Branch created in the core repository.
    pub core_branch: String,
    /// How the core repository obtained its branch.
    pub decision: Option<BranchDecision>,
    /// Whether the version marker was rewritten.
    pub version_updated: bool,
    pub dry_run: bool,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.dry_run { " (dry run)" } else { "" };
        writeln!(f, "Branch {}{}", self.core_branch, mode)?;
        if let Some(decision) = self.decision {
            writeln!(f, "  core: {}", decision)?;
        }
        writeln!(
            f,
            "  version marker: {}",
            if self.version_updated { "updated" } else { "already current" }
        )?;
        writeln!(f, "  branched: {}", self.branched.len())?;
        for name in &self.branched {
            writeln!(f, "    {}", name)?;
        }
        write!(f, "  skipped: {}", self.skipped.len())?;
        for name in &self.skipped {
            write!(f, "\n    {}", name)?;
        }
        Ok(())
    }
}

/// Sequences probe, decide and mutate across the manifest.
///
/// Repositories are processed strictly one after another. Every directory
/// change goes through a [`DirStack`] guard, so the stack is back at its
/// entry depth whenever a step returns, on success or failure.
pub struct Orchestrator<'a> {
    config: RunConfig,
    manifest: &'a Manifest,
    style: &'a dyn BranchStyle,
    runner: &'a ProcessRunner,
    creator: &'a dyn BranchCreator,
    dirs: DirStack,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: RunConfig,
        manifest: &'a Manifest,
        style: &'a dyn BranchStyle,
        runner: &'a ProcessRunner,
        creator: &'a dyn BranchCreator,
    ) -> Self {
        let dirs = DirStack::new(config.work_dir.clone());
        Self {
            config,
            manifest,
            style,
            runner,
            creator,
            dirs,
        }
    }

    /// Current depth of the working-directory stack (1 at rest).
    pub fn dir_depth(&self) -> usize {
        self.dirs.depth()
    }

    /// Skip-list implied by the resume marker.
    pub fn skip_list(&self) -> Result<SkipList> {
        apply_resume_marker(
            &self.manifest.dependent_names(),
            self.config.start_from.as_deref(),
        )
    }

    /// Run the whole sequence. Any failure stops the run; completed steps
    /// are not rolled back.
    pub fn execute(&self) -> Result<RunSummary> {
        let skip = self.skip_list()?;
        let new_branch = self.config.new_branch();
        info!(
            "branching {} from {} using the {} strategy",
            new_branch,
            self.config.source_branch(),
            self.creator.name()
        );

        if !skip.is_empty() {
            info!("resuming: {} repositories already branched", skip.len());
        }

        self.style
            .setup_build_directory(&self.config.work_dir, &Mutator::new(self.runner))?;

        let mut summary = RunSummary {
            skipped: Vec::new(),
            branched: Vec::new(),
            core_branch: new_branch,
            decision: None,
            version_updated: false,
            dry_run: self.runner.is_dry_run(),
        };

        let dependents = self
            .manifest
            .repositories
            .iter()
            .map(|r| (r.name.as_str(), r.branch.as_str()))
            .chain(
                self.manifest
                    .special_repositories
                    .iter()
                    .map(|s| (s.name.as_str(), s.branch.as_str())),
            );

        for (name, branch) in dependents {
            if skip.contains(name) {
                info!("skipping {}: already branched", name);
                summary.skipped.push(name.to_string());
                continue;
            }
            self.branch_repository(name, branch)?;
            summary.branched.push(name.to_string());
        }

        let (decision, version) = self.branch_core()?;
        summary.decision = Some(decision);
        summary.version_updated = matches!(version, VersionUpdate::Updated { .. });
        Ok(summary)
    }

    /// Clone a dependent repository at `source_branch` and give it and its
    /// declared submodules the new branch.
    pub fn branch_repository(&self, name: &str, source_branch: &str) -> Result<()> {
        let mutator = Mutator::new(self.runner);
        let remote = self.config.remote_for(name);

        mutator.clone_or_update(&self.config.work_dir.join(name), &remote, source_branch, Some(1))?;
        let repo = self.dirs.enter(name)?;

        for submodule in self.manifest.submodules_of(name) {
            mutator.init_submodule(repo.path(), submodule)?;
            let sub = self.dirs.enter(submodule)?;
            let sub_remote = Probe::new(self.runner)
                .remote_url(sub.path(), ORIGIN)?
                .ok_or_else(|| {
                    BranchError::Precondition(format!(
                        "submodule '{}' of '{}' has no {} remote",
                        submodule, name, ORIGIN
                    ))
                })?;
            self.give_new_branch(sub.path(), &sub_remote, "HEAD")?;
        }

        self.give_new_branch(repo.path(), &remote, source_branch)
    }

    /// Create and push the new branch in `dir` unless the remote already has it.
    fn give_new_branch(&self, dir: &Path, remote_url: &str, source_branch: &str) -> Result<()> {
        let new_branch = self.config.new_branch();
        let project = project_name(&self.config.repo_path, remote_url);
        let target = RepoTarget {
            project: &project,
            dir,
            remote_url,
            source_branch,
            new_branch: &new_branch,
        };

        if self.creator.has_remote_branch(&target)? {
            info!("{} already has {}, reusing it", project, new_branch);
            return Ok(());
        }

        if self.creator.create_from_base(&target, "HEAD")? == NeedsPush::Yes {
            Mutator::new(self.runner).push(dir, ORIGIN, &new_branch)?;
        }
        Ok(())
    }

    /// Branch the core repository, attach the dependents as submodules,
    /// rewrite the version marker, commit and push.
    pub fn branch_core(&self) -> Result<(BranchDecision, VersionUpdate)> {
        let mutator = Mutator::new(self.runner);
        let probe = Probe::new(self.runner);
        let source = self.config.source_branch();
        let new_branch = self.config.new_branch();
        let canonical = self.config.remote_for(&self.manifest.core.name);
        let clone_source = self.config.source_clone_path.as_str();
        let core_dir = self.config.core_dir();

        // A previous run left origin pointing at the canonical remote.
        if probe.is_working_copy(&core_dir)
            && canonical != clone_source
            && probe.remote_url(&core_dir, ORIGIN)?.as_deref() == Some(canonical.as_str())
        {
            mutator.set_remote_url(&core_dir, ORIGIN, clone_source)?;
        }
        mutator.clone_or_update(&core_dir, clone_source, &source, None)?;
        let core = self.dirs.enter(&self.config.branch_dir)?;
        let dir = core.path();
        mutator.set_remote_url(dir, ORIGIN, &canonical)?;

        let project = project_name(&self.config.repo_path, &canonical);
        let target = RepoTarget {
            project: &project,
            dir,
            remote_url: &canonical,
            source_branch: &source,
            new_branch: &new_branch,
        };

        let has_local_branch = probe.local_branches(dir)?.contains(&new_branch);
        let current = probe.current_branch(dir)?;
        let upstream = format!("{}/{}", ORIGIN, new_branch);
        let facts = ProbeFacts {
            has_local_branch,
            has_remote_branch: self.creator.has_remote_branch(&target)?,
            on_new_branch: current == new_branch,
            local_tracks_remote: has_local_branch
                && probe.tracking_branch_of(dir, &new_branch)?.as_deref() == Some(upstream.as_str()),
        };
        let decision = decide(facts);
        info!("{}: {}", project, decision);

        match decision {
            BranchDecision::UseExistingRemote => {
                info!("reusing remote branch {}", upstream);
                mutator.track_remote_branch(dir, &new_branch)?;
            }
            BranchDecision::ContinueLocalTrackingRemote => mutator.pull(dir)?,
            BranchDecision::SwitchToLocalTrackingRemote => {
                mutator.checkout_existing(dir, &new_branch)?;
                mutator.pull(dir)?;
            }
            BranchDecision::CreateFromBase => {
                let base = format!("{}/{}", ORIGIN, source);
                self.creator.create_from_base(&target, &base)?;
                // The new branch is pushed to where the core was cloned from.
                mutator.set_remote_url(dir, ORIGIN, clone_source)?;
            }
            BranchDecision::NoActionNeeded => {
                if !facts.on_new_branch {
                    warn!(
                        "local branch {} exists without a matching upstream; checking it out",
                        new_branch
                    );
                    mutator.checkout_existing(dir, &new_branch)?;
                }
            }
        }

        for name in self.manifest.dependent_names() {
            if probe.has_submodule(dir, name)? {
                info!("submodule {} already registered", name);
                continue;
            }
            mutator.add_submodule(dir, &new_branch, &self.config.remote_for(name), name)?;
        }

        let settings = dir.join(&self.manifest.core.settings_file);
        let version = fix_version(
            &settings,
            &self.manifest.core.version_variable,
            &self.config.new_version,
        )?;
        match version {
            VersionUpdate::AlreadyCurrent => warn!(
                "{} already declares version {}",
                self.manifest.core.settings_file, self.config.new_version
            ),
            VersionUpdate::Updated { .. } => info!(
                "rewrote {} version marker(s) in {}",
                version.replacements(),
                self.manifest.core.settings_file
            ),
        }

        let pending = probe.working_tree_changes(dir)?;
        if version != VersionUpdate::AlreadyCurrent || !pending.is_empty() {
            mutator.commit_all(dir, &self.style.commit_message(&self.config.new_version))?;
        } else {
            warn!("nothing to commit in {}", project);
        }

        self.report(dir, &source)?;
        mutator.push(dir, ORIGIN, &new_branch)?;
        Ok((decision, version))
    }

    /// Log leftover changes and upstream commits missing from HEAD.
    fn report(&self, dir: &Path, source: &str) -> Result<()> {
        let probe = Probe::new(self.runner);

        let changes = probe.working_tree_changes(dir)?;
        if !changes.is_empty() {
            warn!("uncommitted changes remain:");
            for line in changes.lines() {
                warn!("  {}", line);
            }
        }

        let reference = format!("{}/{}", ORIGIN, source);
        let log = probe.divergence_log(dir, &reference)?;
        if log.is_empty() {
            info!("in sync with {}", reference);
        } else {
            warn!("{} has commits not on this branch:", reference);
            for line in log.lines() {
                warn!("  {}", line);
            }
        }
        Ok(())
    }
}
