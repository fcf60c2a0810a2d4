//! Branch styles.
//!
//! A style supplies the policy a run needs beyond the manifest: where to
//! work, which prefix branch names get, where the core checkout lives and
//! how the scratch directory is prepared. Styles are looked up by name in a
//! static registry.

mod tarball;
mod wmf;

pub use tarball::Tarball;
pub use wmf::Wmf;

use crate::error::{BranchError, Result};
use crate::git::Mutator;
use std::path::{Path, PathBuf};

/// Default location of the Wikimedia repositories.
pub const GERRIT_HEAD: &str = "https://gerrit.wikimedia.org/r";

/// Inputs a style may take from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleOptions {
    /// Replaces the style's scratch directory.
    pub work_dir: Option<PathBuf>,
    /// Review server the repositories live on, e.g. `https://gerrit.example.org/r`.
    pub review_host: Option<String>,
    /// Directory of the release branch checkout (tarball style).
    pub release_branch: Option<String>,
}

pub trait BranchStyle {
    fn short_name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Scratch directory every repository is cloned into.
    fn work_dir(&self) -> PathBuf;

    /// Base path repository names are relative to.
    fn source_path(&self) -> String;

    fn branch_prefix(&self) -> &'static str;

    /// Directory under the work dir that holds the core checkout.
    fn branch_dir(&self) -> Result<String>;

    /// Manifest file inside `base`.
    fn manifest_path(&self, base: &Path) -> PathBuf {
        base.join("config.json")
    }

    /// Prepare the scratch directory before anything is cloned.
    fn setup_build_directory(&self, dir: &Path, mutator: &Mutator<'_>) -> Result<()> {
        mutator.ensure_empty_directory(dir)
    }

    fn commit_message(&self, new_version: &str) -> String {
        format!("Creating new WMF {} branch", new_version)
    }
}

type Constructor = fn(&StyleOptions) -> Box<dyn BranchStyle>;

static REGISTRY: &[(&str, Constructor)] = &[("wmf", new_wmf), ("tarball", new_tarball)];

fn new_wmf(opts: &StyleOptions) -> Box<dyn BranchStyle> {
    Box::new(Wmf::new(opts))
}

fn new_tarball(opts: &StyleOptions) -> Box<dyn BranchStyle> {
    Box::new(Tarball::new(opts))
}

/// Names of every registered style.
pub fn style_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|(name, _)| *name).collect()
}

/// Instantiate the style registered under `name`.
pub fn create_style(name: &str, opts: &StyleOptions) -> Result<Box<dyn BranchStyle>> {
    REGISTRY
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, construct)| construct(opts))
        .ok_or_else(|| {
            BranchError::UserError(format!(
                "`{}` is not a proper brancher (known: {})",
                name,
                style_names().join(", ")
            ))
        })
}

fn default_work_dir(opts: &StyleOptions, name: &str) -> PathBuf {
    opts.work_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(name))
}

fn repo_path(opts: &StyleOptions) -> String {
    let host = opts.review_host.as_deref().unwrap_or(GERRIT_HEAD);
    format!("{}/mediawiki", host.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{ProcessRunner, RetryPolicy, SystemExecutor};
    use tempfile::TempDir;

    #[test]
    fn registry_knows_both_styles() {
        assert_eq!(style_names(), vec!["wmf", "tarball"]);
        for name in style_names() {
            let style = create_style(name, &StyleOptions::default()).unwrap();
            assert_eq!(style.short_name(), name);
            assert!(!style.description().is_empty());
        }
    }

    #[test]
    fn unknown_style_lists_known_ones() {
        let err = create_style("nightly", &StyleOptions::default()).err().unwrap();

        assert!(matches!(err, BranchError::UserError(_)));
        let msg = err.to_string();
        assert!(msg.contains("`nightly` is not a proper brancher"));
        assert!(msg.contains("wmf, tarball"));
    }

    #[test]
    fn wmf_defaults() {
        let style = create_style("wmf", &StyleOptions::default()).unwrap();

        assert_eq!(style.branch_prefix(), "wmf/");
        assert_eq!(style.branch_dir().unwrap(), "wmf");
        assert_eq!(style.source_path(), "https://gerrit.wikimedia.org/r/mediawiki");
        assert_eq!(style.work_dir(), std::env::temp_dir().join("make-wmf-branch"));
        assert_eq!(style.manifest_path(Path::new("/etc/relbranch")), PathBuf::from("/etc/relbranch/config.json"));
        assert_eq!(style.commit_message("1.40.0-wmf.1"), "Creating new WMF 1.40.0-wmf.1 branch");
    }

    #[test]
    fn tarball_takes_explicit_options() {
        let opts = StyleOptions {
            work_dir: Some(PathBuf::from("/srv/mw")),
            review_host: Some("https://gerrit.example.org/r/".to_string()),
            release_branch: Some("REL1_42".to_string()),
        };
        let style = create_style("tarball", &opts).unwrap();

        assert_eq!(style.branch_prefix(), "");
        assert_eq!(style.work_dir(), PathBuf::from("/srv/mw"));
        assert_eq!(style.source_path(), "https://gerrit.example.org/r/mediawiki");
        assert_eq!(style.branch_dir().unwrap(), "REL1_42");
        assert_eq!(
            style.manifest_path(Path::new("/etc/relbranch")),
            PathBuf::from("/etc/relbranch/tarball-config.json")
        );
    }

    #[test]
    fn tarball_requires_release_branch() {
        let style = create_style("tarball", &StyleOptions::default()).unwrap();
        let err = style.branch_dir().unwrap_err();
        assert!(matches!(err, BranchError::UserError(_)));
        assert!(err.to_string().contains("--release-branch"));
    }

    #[test]
    fn wmf_setup_recreates_the_build_directory() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("make-wmf-branch");
        std::fs::create_dir_all(dir.join("stale")).unwrap();
        let runner = ProcessRunner::new(SystemExecutor, RetryPolicy::once(), false);
        let style = create_style("wmf", &StyleOptions::default()).unwrap();

        style.setup_build_directory(&dir, &Mutator::new(&runner)).unwrap();

        assert!(dir.is_dir());
        assert!(!dir.join("stale").exists());
    }

    #[test]
    fn tarball_setup_reuses_an_existing_directory() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("make-tarball-branch");
        std::fs::create_dir_all(dir.join("keep")).unwrap();
        let runner = ProcessRunner::new(SystemExecutor, RetryPolicy::once(), false);
        let style = create_style("tarball", &StyleOptions::default()).unwrap();

        style.setup_build_directory(&dir, &Mutator::new(&runner)).unwrap();

        assert!(dir.join("keep").is_dir());
    }

    #[test]
    fn tarball_setup_creates_a_missing_directory() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("fresh");
        let runner = ProcessRunner::new(SystemExecutor, RetryPolicy::once(), false);
        let style = create_style("tarball", &StyleOptions::default()).unwrap();

        style.setup_build_directory(&dir, &Mutator::new(&runner)).unwrap();

        assert!(dir.is_dir());
    }

    #[test]
    fn tarball_setup_refuses_to_replace_a_file() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("occupied");
        std::fs::write(&dir, "not a directory").unwrap();
        let runner = ProcessRunner::new(SystemExecutor, RetryPolicy::once(), false);
        let style = create_style("tarball", &StyleOptions::default()).unwrap();

        let err = style
            .setup_build_directory(&dir, &Mutator::new(&runner))
            .unwrap_err();

        assert!(matches!(err, BranchError::Precondition(_)));
        assert!(err.to_string().contains("file exists"));
    }
}
