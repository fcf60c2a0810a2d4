//! State-changing repository operations.

use super::{ORIGIN, Probe};
use crate::error::{BranchError, Result};
use crate::process::{CommandLine, ProcessRunner};
use std::path::Path;
use tracing::info;

/// State-changing git operations. Every failure is fatal once retries are exhausted.
#[derive(Clone, Copy)]
pub struct Mutator<'a> {
    runner: &'a ProcessRunner,
}

impl<'a> Mutator<'a> {
    pub fn new(runner: &'a ProcessRunner) -> Self {
        Self { runner }
    }

    /// Make `dest` a clone of `remote` checked out at `branch`.
    ///
    /// An existing clone whose `origin` is `remote` is fast-forwarded; a
    /// missing path is cloned (shallow and single-branch when `depth` is
    /// set). Anything else at `dest` is a conflict.
    pub fn clone_or_update(
        &self,
        dest: &Path,
        remote: &str,
        branch: &str,
        depth: Option<u32>,
    ) -> Result<()> {
        let probe = Probe::new(self.runner);

        if dest.exists() {
            if probe.is_working_copy(dest)
                && probe.remote_url(dest, ORIGIN)?.as_deref() == Some(remote)
            {
                info!("{} is already a clone of {}, updating", dest.display(), remote);
                return self.pull(dest);
            }
            return Err(BranchError::Precondition(format!(
                "'{}' exists but is not a clone of '{}'",
                dest.display(),
                remote
            )));
        }

        let (parent, name) = match (dest.parent(), dest.file_name()) {
            (Some(parent), Some(name)) => (parent, name.to_string_lossy().to_string()),
            _ => {
                return Err(BranchError::UserError(format!(
                    "cannot clone into '{}'",
                    dest.display()
                )));
            }
        };
        std::fs::create_dir_all(parent).map_err(|e| {
            BranchError::Io(format!("failed to create '{}': {}", parent.display(), e))
        })?;

        let mut cmd = CommandLine::git(["clone", "-q", "--branch", branch]);
        if let Some(depth) = depth {
            cmd = cmd.args(["--depth".to_string(), depth.to_string(), "--single-branch".to_string()]);
        }
        self.runner
            .run_with_retry(parent, &cmd.args([remote, name.as_str()]))?;
        Ok(())
    }

    /// Remove `dir` recursively if present, then recreate it empty.
    ///
    /// Scratch directories are local state, so this runs in dry-run mode too.
    pub fn ensure_empty_directory(&self, dir: &Path) -> Result<()> {
        if dir.exists() {
            info!("removing {}", dir.display());
            std::fs::remove_dir_all(dir).map_err(|e| {
                BranchError::Io(format!("failed to remove '{}': {}", dir.display(), e))
            })?;
        }
        std::fs::create_dir_all(dir)
            .map_err(|e| BranchError::Io(format!("failed to create '{}': {}", dir.display(), e)))
    }

    /// Create `branch` from `base` and switch to it.
    /// Create `branch` at `base` and switch to it. The new branch does not
    /// track `base`; [`push`](Self::push) sets its upstream.
    pub fn checkout_new(&self, repo_dir: &Path, branch: &str, base: &str) -> Result<()> {
        self.git(repo_dir, &["checkout", "-q", "--no-track", "-b", branch, base])
    }

    pub fn checkout_existing(&self, repo_dir: &Path, branch: &str) -> Result<()> {
        self.git(repo_dir, &["checkout", "-q", branch])
    }

    /// Fetch `branch` from origin and check it out as a local tracking branch.
    pub fn track_remote_branch(&self, repo_dir: &Path, branch: &str) -> Result<()> {
        let refspec = format!("+refs/heads/{0}:refs/remotes/{1}/{0}", branch, ORIGIN);
        self.git(repo_dir, &["fetch", "-q", ORIGIN, &refspec])?;
        let upstream = format!("{}/{}", ORIGIN, branch);
        self.git(repo_dir, &["checkout", "-q", "-b", branch, "--track", &upstream])
    }

    pub fn pull(&self, repo_dir: &Path) -> Result<()> {
        self.git(repo_dir, &["pull", "-q", "--ff-only"])
    }

    pub fn fetch(&self, repo_dir: &Path) -> Result<()> {
        self.git(repo_dir, &["fetch", "-q", ORIGIN])
    }

    /// Register `remote` as a submodule at `path`, pinned to `branch`.
    pub fn add_submodule(&self, repo_dir: &Path, branch: &str, remote: &str, path: &str) -> Result<()> {
        self.git(
            repo_dir,
            &["submodule", "add", "-f", "-b", branch, "-q", remote, path],
        )
        .map_err(|e| BranchError::Submodule {
            name: path.to_string(),
            source: Box::new(e),
        })
    }

    /// Initialize and check out one submodule of `repo_dir`.
    pub fn init_submodule(&self, repo_dir: &Path, path: &str) -> Result<()> {
        self.git(repo_dir, &["submodule", "update", "--init", path])
            .map_err(|e| BranchError::Submodule {
                name: path.to_string(),
                source: Box::new(e),
            })
    }

    pub fn commit_all(&self, repo_dir: &Path, message: &str) -> Result<()> {
        self.git(repo_dir, &["commit", "-a", "-q", "-m", message])
    }

    /// Push `branch` to `remote`. Suppressed in dry-run mode.
    pub fn push(&self, repo_dir: &Path, remote: &str, branch: &str) -> Result<()> {
        self.runner
            .run_if_not_dry_run(repo_dir, &CommandLine::git(["push", "-u", remote, branch]))?;
        Ok(())
    }

    pub fn set_remote_url(&self, repo_dir: &Path, remote: &str, url: &str) -> Result<()> {
        self.git(repo_dir, &["remote", "set-url", remote, url])
    }

    fn git(&self, repo_dir: &Path, args: &[&str]) -> Result<()> {
        self.runner
            .run_with_retry(repo_dir, &CommandLine::git(args.iter().copied()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{RetryPolicy, SystemExecutor};
    use crate::test_support::{
        FakeExecutor, configure_identity, create_test_repo, failing, git, no_wait,
    };
    use tempfile::TempDir;

    fn real_runner() -> ProcessRunner {
        ProcessRunner::new(SystemExecutor, RetryPolicy::once(), false)
    }

    #[test]
    fn clone_or_update_clones_missing_destination() {
        let upstream = create_test_repo();
        git(upstream.path(), &["branch", "REL1_41"]);
        let work = TempDir::new().unwrap();
        let dest = work.path().join("nested/clone");
        let url = upstream.path().to_string_lossy().to_string();
        let runner = real_runner();

        Mutator::new(&runner)
            .clone_or_update(&dest, &url, "REL1_41", None)
            .unwrap();

        assert_eq!(Probe::new(&runner).current_branch(&dest).unwrap(), "REL1_41");
    }

    #[test]
    fn shallow_clone_uses_depth_and_single_branch() {
        let fake = FakeExecutor::new();
        let runner = ProcessRunner::new(fake.clone(), no_wait(), false);
        let work = TempDir::new().unwrap();

        Mutator::new(&runner)
            .clone_or_update(
                &work.path().join("Cite"),
                "https://example.org/r/extensions/Cite",
                "master",
                Some(1),
            )
            .unwrap();

        assert_eq!(
            fake.calls_with_cwd(),
            vec![(
                work.path().to_path_buf(),
                "git clone -q --branch master --depth 1 --single-branch https://example.org/r/extensions/Cite Cite"
                    .to_string()
            )]
        );
    }

    #[test]
    fn clone_or_update_pulls_matching_clone() {
        let upstream = create_test_repo();
        let work = TempDir::new().unwrap();
        let url = upstream.path().to_string_lossy().to_string();
        git(work.path(), &["clone", "-q", &url, "clone"]);
        let dest = work.path().join("clone");

        std::fs::write(upstream.path().join("later.txt"), "later\n").unwrap();
        git(upstream.path(), &["add", "."]);
        git(upstream.path(), &["commit", "-q", "-m", "Later"]);

        let runner = real_runner();
        Mutator::new(&runner)
            .clone_or_update(&dest, &url, "master", None)
            .unwrap();

        assert!(dest.join("later.txt").exists());
    }

    #[test]
    fn clone_or_update_rejects_foreign_directory() {
        let work = TempDir::new().unwrap();
        let dest = work.path().join("occupied");
        std::fs::create_dir(&dest).unwrap();
        std::fs::write(dest.join("file"), "x").unwrap();
        let runner = real_runner();

        let err = Mutator::new(&runner)
            .clone_or_update(&dest, "https://example.org/r/core", "master", None)
            .unwrap_err();

        assert!(matches!(err, BranchError::Precondition(_)));
        assert!(err.to_string().contains("is not a clone of"));
    }

    #[test]
    fn clone_or_update_rejects_clone_of_other_remote() {
        let upstream = create_test_repo();
        let work = TempDir::new().unwrap();
        let url = upstream.path().to_string_lossy().to_string();
        git(work.path(), &["clone", "-q", &url, "clone"]);
        let runner = real_runner();

        let err = Mutator::new(&runner)
            .clone_or_update(&work.path().join("clone"), "https://example.org/r/other", "master", None)
            .unwrap_err();

        assert!(matches!(err, BranchError::Precondition(_)));
    }

    #[test]
    fn ensure_empty_directory_recreates() {
        let work = TempDir::new().unwrap();
        let dir = work.path().join("build");
        std::fs::create_dir_all(dir.join("stale")).unwrap();
        let runner = real_runner();

        Mutator::new(&runner).ensure_empty_directory(&dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn checkout_commit_and_push_against_real_remote() {
        let upstream = create_test_repo();
        let work = TempDir::new().unwrap();
        let url = upstream.path().to_string_lossy().to_string();
        git(work.path(), &["clone", "-q", &url, "clone"]);
        let clone = work.path().join("clone");
        configure_identity(&clone);
        let runner = real_runner();
        let mutator = Mutator::new(&runner);

        let probe = Probe::new(&runner);

        mutator.checkout_new(&clone, "REL1_42", "origin/master").unwrap();
        assert_eq!(probe.tracking_branch_of(&clone, "REL1_42").unwrap(), None);
        std::fs::write(clone.join("README.md"), "# Release\n").unwrap();
        mutator.commit_all(&clone, "Release prep").unwrap();
        mutator.push(&clone, ORIGIN, "REL1_42").unwrap();
        assert_eq!(
            probe.tracking_branch_of(&clone, "REL1_42").unwrap().as_deref(),
            Some("origin/REL1_42")
        );

        assert_eq!(
            git(upstream.path(), &["log", "-1", "--format=%s", "REL1_42"]),
            "Release prep"
        );

        mutator.checkout_existing(&clone, "master").unwrap();
        assert_eq!(probe.current_branch(&clone).unwrap(), "master");
    }

    #[test]
    fn track_remote_branch_sets_upstream() {
        let upstream = create_test_repo();
        git(upstream.path(), &["branch", "wmf/1.40.0-wmf.1"]);
        let work = TempDir::new().unwrap();
        let url = upstream.path().to_string_lossy().to_string();
        git(
            work.path(),
            &["clone", "-q", "--single-branch", "--branch", "master", &url, "clone"],
        );
        let clone = work.path().join("clone");
        let runner = real_runner();

        Mutator::new(&runner)
            .track_remote_branch(&clone, "wmf/1.40.0-wmf.1")
            .unwrap();

        let probe = Probe::new(&runner);
        assert_eq!(probe.current_branch(&clone).unwrap(), "wmf/1.40.0-wmf.1");
        assert_eq!(
            probe.tracking_branch_of(&clone, "wmf/1.40.0-wmf.1").unwrap(),
            Some("origin/wmf/1.40.0-wmf.1".to_string())
        );
    }

    #[test]
    fn push_is_suppressed_in_dry_run() {
        let fake = FakeExecutor::new();
        let runner = ProcessRunner::new(fake.clone(), no_wait(), true);

        Mutator::new(&runner)
            .push(Path::new("/w/core"), ORIGIN, "1.40.0-wmf.1")
            .unwrap();

        assert!(fake.calls().is_empty());
    }

    #[test]
    fn add_submodule_failure_names_the_submodule() {
        let fake = FakeExecutor::new();
        fake.respond("submodule add", failing(128));
        let runner = ProcessRunner::new(fake.clone(), no_wait(), false);

        let err = Mutator::new(&runner)
            .add_submodule(
                Path::new("/w/core"),
                "1.40.0-wmf.1",
                "https://example.org/r/extensions/Cite",
                "extensions/Cite",
            )
            .unwrap_err();

        assert!(matches!(err, BranchError::Submodule { ref name, .. } if name == "extensions/Cite"));
        assert!(err.to_string().contains("extensions/Cite"));
        assert_eq!(err.exit_code(), crate::exit_codes::COMMAND_FAILURE);
    }

    #[test]
    fn add_submodule_pins_branch() {
        let fake = FakeExecutor::new();
        let runner = ProcessRunner::new(fake.clone(), no_wait(), false);

        Mutator::new(&runner)
            .add_submodule(
                Path::new("/w/core"),
                "1.40.0-wmf.1",
                "https://example.org/r/extensions/Cite",
                "extensions/Cite",
            )
            .unwrap();

        assert_eq!(
            fake.calls(),
            vec![
                "git submodule add -f -b 1.40.0-wmf.1 -q https://example.org/r/extensions/Cite extensions/Cite"
                    .to_string()
            ]
        );
    }
}
