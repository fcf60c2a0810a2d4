//! Resume marker handling.

use crate::error::{BranchError, Result};
use std::collections::BTreeSet;

/// Repositories a resumed run leaves alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipList {
    names: BTreeSet<String>,
}

impl SkipList {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Skip every name in `names` up to and including `marker`.
///
/// No marker (or an empty one) means a full run. A marker that names no
/// repository is fatal, since silently re-branching everything is never
/// what the operator wanted.
pub fn apply_resume_marker(names: &[&str], marker: Option<&str>) -> Result<SkipList> {
    let marker = match marker.map(str::trim) {
        None | Some("") => return Ok(SkipList::default()),
        Some(marker) => marker,
    };

    let position = names.iter().position(|name| *name == marker).ok_or_else(|| {
        BranchError::Precondition(format!(
            "could not find '{}' in any branched repository list",
            marker
        ))
    })?;

    Ok(SkipList {
        names: names[..=position].iter().map(|s| s.to_string()).collect(),
    })
}
