//! Repository manifest and run configuration for relbranch.
//!
//! The manifest names the core repository and every repository that is
//! branched alongside it. It is read once at startup (YAML, or the legacy
//! `config.json` layout) and never mutated during a run. [`RunConfig`]
//! holds the per-run inputs assembled from the command line.

mod model;
mod operations;
mod run;
pub mod types;


// Re-export public API
pub use model::Manifest;
pub use run::RunConfig;
pub use types::{CoreRepository, Repository, ReviewServer, SpecialRepository, StrategyKind};
