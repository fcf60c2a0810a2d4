//! Manifest struct definition.

use super::types::*;
use serde::Deserialize;
use std::collections::BTreeMap;

/// The set of repositories a run branches.
///
/// Loaded from `config.json` / `tarball-config.json` (legacy key names) or
/// an equivalent YAML file. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Base URL or path every repository name is relative to. Overrides
    /// the branch style's default when set.
    pub repo_path: Option<String>,

    /// The core repository the other repositories become submodules of.
    pub core: CoreRepository,

    /// Dependent repositories, branched in this order.
    #[serde(alias = "extensions")]
    pub repositories: Vec<Repository>,

    /// Submodule paths inside a dependent repository that need the new
    /// branch too, keyed by repository name.
    #[serde(deserialize_with = "submodule_lists")]
    pub submodules: BTreeMap<String, Vec<String>>,

    /// Repositories branched from an explicit source branch, in
    /// declaration order.
    #[serde(alias = "special_extensions", deserialize_with = "ordered_specials")]
    pub special_repositories: Vec<SpecialRepository>,

    /// Review server used by the API strategy.
    pub review_server: Option<ReviewServer>,

    /// Default strategy when the command line does not pick one.
    pub strategy: StrategyKind,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            repo_path: None,
            core: CoreRepository::default(),
            repositories: Vec::new(),
            submodules: BTreeMap::new(),
            special_repositories: Vec::new(),
            review_server: None,
            strategy: StrategyKind::default(),
        }
    }
}
