//! Scoped working-directory stack.
//!
//! The orchestrator walks into repositories and their submodules and back
//! out again. Instead of changing the process working directory, it keeps a
//! logical stack of directories and passes the top of the stack to every
//! command it runs. Entering a directory hands back a [`DirGuard`]; dropping
//! the guard pops the stack back to where it was, on success and on early
//! return through `?` alike.

use crate::error::{BranchError, Result};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub struct DirStack {
    stack: RefCell<Vec<PathBuf>>,
}

impl DirStack {
    /// Create a stack rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            stack: RefCell::new(vec![root.into()]),
        }
    }

    /// The directory commands currently run in.
    pub fn current(&self) -> PathBuf {
        self.stack
            .borrow()
            .last()
            .cloned()
            .unwrap_or_default()
    }

    /// Number of entries, the root included.
    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }

    /// Descend into `dir` (relative paths resolve against the current
    /// directory). Fails if the target is not a directory.
    pub fn enter(&self, dir: impl AsRef<Path>) -> Result<DirGuard<'_>> {
        let target = self.current().join(dir.as_ref());
        if !target.is_dir() {
            return Err(BranchError::Precondition(format!(
                "unable to change working directory to '{}'",
                target.display()
            )));
        }

        let mut stack = self.stack.borrow_mut();
        let restore_to = stack.len();
        debug!("cd {}", target.display());
        stack.push(target.clone());

        Ok(DirGuard {
            stack: self,
            path: target,
            restore_to,
        })
    }
}

/// Keeps a directory on the stack for as long as it lives.
#[derive(Debug)]
pub struct DirGuard<'a> {
    stack: &'a DirStack,
    path: PathBuf,
    restore_to: usize,
}

impl DirGuard<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirGuard<'_> {
    fn drop(&mut self) {
        let mut stack = self.stack.stack.borrow_mut();
        stack.truncate(self.restore_to);
        if let Some(prev) = stack.last() {
            debug!("cd {}", prev.display());
        }
    }
}
