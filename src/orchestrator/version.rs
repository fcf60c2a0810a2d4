//! Version marker rewrite.

use crate::error::{BranchError, Result};
use regex::Regex;
use std::path::Path;

/// Outcome of [`fix_version`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionUpdate {
    /// The marker was rewritten.
    Updated { replacements: usize },
    /// The marker already held the new version; the file was left alone.
    AlreadyCurrent,
}

impl VersionUpdate {
    pub fn replacements(&self) -> usize {
        match self {
            VersionUpdate::Updated { replacements } => *replacements,
            VersionUpdate::AlreadyCurrent => 0,
        }
    }
}

/// Rewrite the single `$<variable> = ...;` assignment in `path` to `new_version`.
///
/// The assignment must start a line (leading whitespace allowed). Zero or
/// several matches are a precondition failure.
pub fn fix_version(path: &Path, variable: &str, new_version: &str) -> Result<VersionUpdate> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| BranchError::Io(format!("failed to read '{}': {}", path.display(), e)))?;

    let (updated, update) = rewrite_marker(&content, variable, new_version)
        .map_err(|msg| BranchError::Precondition(format!("{} in '{}'", msg, path.display())))?;

    if let VersionUpdate::Updated { .. } = update {
        std::fs::write(path, updated)
            .map_err(|e| BranchError::Io(format!("failed to write '{}': {}", path.display(), e)))?;
    }
    Ok(update)
}

fn rewrite_marker(
    content: &str,
    variable: &str,
    new_version: &str,
) -> std::result::Result<(String, VersionUpdate), String> {
    let ident = format!("${}", variable.trim_start_matches('$'));
    let pattern = format!(
        r"(?m)^([ \t]*{}[ \t]*=[ \t]*)[^;\r\n]*(;[ \t]*\r?)$",
        regex::escape(&ident)
    );
    let re = Regex::new(&pattern).map_err(|e| format!("invalid version marker pattern: {}", e))?;

    match re.find_iter(content).count() {
        0 => return Err(format!("version marker {} not found", ident)),
        1 => {}
        n => return Err(format!("version marker {} found {} times, expected once", ident, n)),
    }

    let literal = format!("'{}'", new_version);
    let updated = re
        .replace(content, |caps: &regex::Captures| {
            format!("{}{}{}", &caps[1], literal, &caps[2])
        })
        .into_owned();

    if updated == content {
        Ok((updated, VersionUpdate::AlreadyCurrent))
    } else {
        Ok((updated, VersionUpdate::Updated { replacements: 1 }))
    }
}
