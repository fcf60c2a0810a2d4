use super::{BranchStyle, StyleOptions, default_work_dir, repo_path};
use crate::error::Result;
use std::path::PathBuf;

/// Weekly deployment branches (`wmf/<version>`).
pub struct Wmf {
    work_dir: PathBuf,
    repo_path: String,
}

impl Wmf {
    pub fn new(opts: &StyleOptions) -> Self {
        Self {
            work_dir: default_work_dir(opts, "make-wmf-branch"),
            repo_path: repo_path(opts),
        }
    }
}

impl BranchStyle for Wmf {
    fn short_name(&self) -> &'static str {
        "wmf"
    }

    fn description(&self) -> &'static str {
        "Create a WMF Branch"
    }

    fn work_dir(&self) -> PathBuf {
        self.work_dir.clone()
    }

    fn source_path(&self) -> String {
        self.repo_path.clone()
    }

    fn branch_prefix(&self) -> &'static str {
        "wmf/"
    }

    fn branch_dir(&self) -> Result<String> {
        Ok("wmf".to_string())
    }
}
