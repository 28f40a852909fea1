//! Invocation of the external clone binary.
//!
//! Clones go through the system `git`, which automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What a finished clone subprocess reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloneStatus {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    /// Captured standard error.
    pub stderr: String,
}

impl CloneStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Trait for the clone step - allows mocking in tests
pub trait CloneRunner: Send + Sync {
    /// Clones `url` into `destination`.
    ///
    /// `Err` means the clone process could not be started at all. A process
    /// that started and failed is an `Ok` carrying its non-zero status.
    fn clone_repo(&self, url: &str, destination: &Path, recursive: bool)
        -> io::Result<CloneStatus>;
}

/// Runs `<binary> clone --quiet [--recursive] <url> <destination>`.
#[derive(Debug, Clone)]
pub struct GitCommand {
    binary: PathBuf,
}

impl GitCommand {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for GitCommand {
    fn default() -> Self {
        Self::new(crate::defaults::DEFAULT_GIT_BINARY)
    }
}

impl CloneRunner for GitCommand {
    fn clone_repo(
        &self,
        url: &str,
        destination: &Path,
        recursive: bool,
    ) -> io::Result<CloneStatus> {
        let output = Command::new(&self.binary)
            .args(clone_args(url, destination, recursive))
            // Never block a worker on a credential prompt.
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()?;

        Ok(CloneStatus {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Argument vector for a clone, without the binary itself.
pub fn clone_args(url: &str, destination: &Path, recursive: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["clone".into(), "--quiet".into()];
    if recursive {
        args.push("--recursive".into());
    }
    args.push(url.into());
    args.push(destination.into());
    args
}

/// Heuristic hint for the usual causes of a failed clone, used in log output.
pub fn failure_hint(stderr: &str) -> Option<&'static str> {
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        Some("check SSH keys, credential helpers or token access to the repository")
    } else if stderr.contains("already exists and is not an empty directory") {
        Some("destination is not empty; use --overwrite to replace it")
    } else {
        None
    }
}
