//! Review-server branch service.
//!
//! The API strategy creates branches through the review server's REST
//! interface instead of pushing them with git. This module defines the
//! service interface and the Gerrit implementation.

mod gerrit;

pub use gerrit::GerritBranchService;

use crate::error::Result;
use serde::Deserialize;
use std::collections::BTreeSet;

/// A branch as reported by the review server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BranchInfo {
    /// Full ref name, e.g. `refs/heads/wmf/1.40.0-wmf.1`.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Commit the branch points at (for symbolic refs, the target name).
    #[serde(default)]
    pub revision: String,
}

/// Branch operations on a review server.
///
/// Listings may be cached per project. Creating a branch through
/// [`create_branch`](Self::create_branch) invalidates that project's cache.
pub trait BranchService {
    /// Names of all branches of `project`, without the `refs/heads/` prefix.
    fn list_branches(&self, project: &str) -> Result<BTreeSet<String>>;

    fn has_branch(&self, project: &str, branch: &str) -> Result<bool> {
        Ok(self.list_branches(project)?.contains(branch))
    }

    /// Create `new_branch` in `project` pointing at `base`.
    fn create_branch(&self, project: &str, base: &str, new_branch: &str) -> Result<BranchInfo>;
}
