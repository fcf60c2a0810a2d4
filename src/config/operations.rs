//! Manifest loading, validation, and lookups.

use super::model::Manifest;
use crate::error::{BranchError, Result};
use std::collections::BTreeSet;
use std::path::Path;

impl Manifest {
    /// Load a manifest file. `.json` files are parsed as JSON, anything else
    /// as YAML.
    ///
    /// # Returns
    ///
    /// * `Ok(Manifest)` - Successfully loaded and validated manifest
    /// * `Err(BranchError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            BranchError::UserError(format!(
                "failed to read manifest '{}': {}",
                path.display(),
                e
            ))
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Parse a manifest from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let manifest: Manifest = serde_yaml::from_str(yaml)
            .map_err(|e| BranchError::UserError(format!("failed to parse manifest YAML: {}", e)))?;

        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)
            .map_err(|e| BranchError::UserError(format!("failed to parse manifest JSON: {}", e)))?;

        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate manifest values.
    ///
    /// Validation rules:
    /// - `repo_path` (when set) and the core name must be non-empty
    /// - repository names must be non-empty and unique across both lists
    /// - every `submodules` key must name a declared repository
    /// - the API strategy needs `review_server.url`
    pub fn validate(&self) -> Result<()> {
        if self.repo_path.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(BranchError::UserError(
                "manifest validation failed: repo_path must be non-empty".to_string(),
            ));
        }

        if self.core.name.trim().is_empty() {
            return Err(BranchError::UserError(
                "manifest validation failed: core.name must be non-empty".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for name in self.dependent_names() {
            if name.trim().is_empty() {
                return Err(BranchError::UserError(
                    "manifest validation failed: repository names must be non-empty".to_string(),
                ));
            }
            if !seen.insert(name) {
                return Err(BranchError::UserError(format!(
                    "manifest validation failed: repository '{}' is declared more than once",
                    name
                )));
            }
        }

        for repo in self.submodules.keys() {
            if !seen.contains(repo.as_str()) {
                return Err(BranchError::UserError(format!(
                    "manifest validation failed: submodules listed for undeclared repository '{}'",
                    repo
                )));
            }
        }

        if self.strategy == super::StrategyKind::Api
            && self
                .review_server
                .as_ref()
                .is_none_or(|server| server.url.trim().is_empty())
        {
            return Err(BranchError::UserError(
                "manifest validation failed: strategy 'api' requires review_server.url".to_string(),
            ));
        }

        Ok(())
    }

    /// Dependent repository names in walk order: repositories, then special
    /// repositories.
    pub fn dependent_names(&self) -> Vec<&str> {
        self.repositories
            .iter()
            .map(|r| r.name.as_str())
            .chain(self.special_repositories.iter().map(|s| s.name.as_str()))
            .collect()
    }

    /// Submodule paths of `repository` that need the new branch.
    pub fn submodules_of(&self, repository: &str) -> &[String] {
        self.submodules
            .get(repository)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
