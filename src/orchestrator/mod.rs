//! Branch orchestration.
//!
//! Walks the dependent repositories, giving each (and its declared
//! submodules) the new branch, then branches the core repository, attaches
//! the dependents as submodules, rewrites the version marker and pushes.

mod decision;
mod engine;
mod resume;
mod strategy;
mod version;


pub use decision::{BranchDecision, ProbeFacts, decide};
pub use engine::{Orchestrator, RunSummary};
pub use resume::{SkipList, apply_resume_marker};
pub use strategy::{ApiCreator, BranchCreator, LocalGitCreator, NeedsPush, RepoTarget, project_name};
pub use version::{VersionUpdate, fix_version};
