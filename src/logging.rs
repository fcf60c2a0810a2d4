//! Logging setup.
//!
//! Diagnostics go to stderr through a `tracing_subscriber::fmt` subscriber.
//! `--verbose` and `--quiet` pick the level; otherwise `RELBRANCH_LOG`, then
//! `RUST_LOG`, then `info`.

use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "RELBRANCH_LOG";

/// Filter directive for the given flags, or `None` to defer to the environment.
fn flag_level(verbose: bool, quiet: bool) -> Option<&'static str> {
    if verbose {
        Some("debug")
    } else if quiet {
        Some("warn")
    } else {
        None
    }
}

fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if let Some(level) = flag_level(verbose, quiet) {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbose: bool, quiet: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose, quiet))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_pick_the_level() {
        assert_eq!(flag_level(true, false), Some("debug"));
        assert_eq!(flag_level(false, true), Some("warn"));
        assert_eq!(flag_level(false, false), None);
    }

    #[test]
    fn flags_override_the_environment() {
        assert_eq!(build_filter(true, false).to_string(), "debug");
        assert_eq!(build_filter(false, true).to_string(), "warn");
    }
}
