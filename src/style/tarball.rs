use super::{BranchStyle, StyleOptions, default_work_dir, repo_path};
use crate::error::{BranchError, Result};
use crate::git::Mutator;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Release branches prepared for a tarball.
///
/// The scratch directory survives between runs so a release manager can
/// resume with an existing core checkout.
pub struct Tarball {
    work_dir: PathBuf,
    repo_path: String,
    release_branch: Option<String>,
}

impl Tarball {
    pub fn new(opts: &StyleOptions) -> Self {
        Self {
            work_dir: default_work_dir(opts, "make-tarball-branch"),
            repo_path: repo_path(opts),
            release_branch: opts.release_branch.clone(),
        }
    }
}

impl BranchStyle for Tarball {
    fn short_name(&self) -> &'static str {
        "tarball"
    }

    fn description(&self) -> &'static str {
        "Prepare the tree for a tarball release"
    }

    fn work_dir(&self) -> PathBuf {
        self.work_dir.clone()
    }

    fn source_path(&self) -> String {
        self.repo_path.clone()
    }

    fn branch_prefix(&self) -> &'static str {
        ""
    }

    fn branch_dir(&self) -> Result<String> {
        self.release_branch
            .clone()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| {
                BranchError::UserError(
                    "the tarball style needs --release-branch <DIR>".to_string(),
                )
            })
    }

    fn manifest_path(&self, base: &Path) -> PathBuf {
        base.join("tarball-config.json")
    }

    fn setup_build_directory(&self, dir: &Path, _mutator: &Mutator<'_>) -> Result<()> {
        if dir.is_dir() {
            debug!("reusing build directory {}", dir.display());
            return Ok(());
        }
        if dir.symlink_metadata().is_ok() {
            return Err(BranchError::Precondition(format!(
                "unable to create build directory {} because file exists",
                dir.display()
            )));
        }
        std::fs::create_dir_all(dir).map_err(|e| {
            BranchError::Io(format!(
                "unable to create build directory {}: {}",
                dir.display(),
                e
            ))
        })
    }
}
