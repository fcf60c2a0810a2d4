use crate::error::Result;
use crate::process::{CommandLine, CommandResult, Executor, RetryPolicy};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Scripted executor
// ============================================================================

type CloneHook = Box<dyn Fn(&Path)>;

struct Rule {
    pattern: String,
    responses: VecDeque<CommandResult>,
}

#[derive(Default)]
struct FakeState {
    rules: Vec<Rule>,
    calls: Vec<(PathBuf, String)>,
    clone_hook: Option<CloneHook>,
}

/// Executor that records every command and answers from a script.
///
/// A rule matches when its pattern is a substring of `program args...`.
/// The most recently added matching rule wins; its responses are consumed
/// in order and the last one repeats. Unmatched commands succeed with empty
/// output. `git clone` creates its destination directory and runs the clone
/// hook.
#[derive(Clone, Default)]
pub(crate) struct FakeExecutor {
    state: Rc<RefCell<FakeState>>,
}

impl FakeExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, pattern: &str, result: CommandResult) {
        self.respond_sequence(pattern, vec![result]);
    }

    pub(crate) fn respond_sequence(&self, pattern: &str, results: Vec<CommandResult>) {
        self.state.borrow_mut().rules.push(Rule {
            pattern: pattern.to_string(),
            responses: results.into(),
        });
    }

    pub(crate) fn on_clone(&self, hook: impl Fn(&Path) + 'static) {
        self.state.borrow_mut().clone_hook = Some(Box::new(hook));
    }

    /// Every command line executed so far.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.state
            .borrow()
            .calls
            .iter()
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// Working directories paired with command lines.
    pub(crate) fn calls_with_cwd(&self) -> Vec<(PathBuf, String)> {
        self.state.borrow().calls.clone()
    }
}

impl Executor for FakeExecutor {
    fn execute(&self, cwd: &Path, command: &CommandLine) -> Result<CommandResult> {
        let line = std::iter::once(command.program())
            .chain(command.arguments().iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");

        let mut state = self.state.borrow_mut();
        state.calls.push((cwd.to_path_buf(), line.clone()));

        let args = command.arguments();
        if command.program() == "git" && args.first().map(String::as_str) == Some("clone") {
            if let Some(dest) = args.last() {
                let dest = cwd.join(dest);
                std::fs::create_dir_all(&dest).unwrap();
                if let Some(hook) = &state.clone_hook {
                    hook(&dest);
                }
            }
        }

        for rule in state.rules.iter_mut().rev() {
            if line.contains(&rule.pattern) {
                let result = if rule.responses.len() > 1 {
                    rule.responses.pop_front().unwrap()
                } else {
                    rule.responses.front().cloned().unwrap_or_else(CommandResult::ok)
                };
                return Ok(result);
            }
        }

        Ok(CommandResult::ok())
    }
}

/// A failed result with the given status.
pub(crate) fn failing(code: i32) -> CommandResult {
    CommandResult::new(code, "", "fatal: simulated failure\n")
}

/// Retry policy with the production attempt count but no sleeping.
pub(crate) fn no_wait() -> RetryPolicy {
    RetryPolicy {
        backoff: Duration::ZERO,
        ..RetryPolicy::default()
    }
}

/// Assert that each pattern occurs in `calls`, in this order.
pub(crate) fn assert_in_order(calls: &[String], patterns: &[&str]) {
    let mut pos = 0;
    for pattern in patterns {
        match calls[pos..].iter().position(|c| c.contains(pattern)) {
            Some(offset) => pos += offset + 1,
            None => panic!(
                "expected `{}` after position {} in:\n{}",
                pattern,
                pos,
                calls.join("\n")
            ),
        }
    }
}

// ============================================================================
// Log capture
// ============================================================================

#[derive(Clone)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a debug-level subscriber and return what it logged.
pub(crate) fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buf = SharedBuf(Arc::new(Mutex::new(Vec::new())));
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();

    let out = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buf.0.lock().unwrap()).into_owned();
    (out, logs)
}

// ============================================================================
// Real git repositories
// ============================================================================

pub(crate) fn create_test_repo() -> TempDir {
    create_repo(&[("README.md", "# Test\n")])
}

/// A repository on `master` with the given files committed.
pub(crate) fn create_repo(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();

    git(path, &["init", "-q"]);
    // Deterministic default branch name across environments.
    git(path, &["symbolic-ref", "HEAD", "refs/heads/master"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);

    for (name, contents) in files {
        let file = path.join(name);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(file, contents).unwrap();
    }
    git(path, &["add", "."]);
    git(path, &["commit", "-q", "-m", "Initial commit"]);

    temp_dir
}

/// Give a clone an identity so it can commit.
pub(crate) fn configure_identity(repo_dir: &Path) {
    git(repo_dir, &["config", "user.email", "test@example.com"]);
    git(repo_dir, &["config", "user.name", "Test User"]);
}

pub(crate) fn git(repo_dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
