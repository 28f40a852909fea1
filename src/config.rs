//! # Run Configuration
//!
//! `MirrorConfig` is the record the command-line front end hands to the
//! library. It carries everything the engine needs to turn a repository list
//! into download tasks: where to put them, which repositories to include, and
//! the skip/overwrite/dry-run policy.
//!
//! The config holds no credentials. The API token belongs to the lister that
//! uses it, so it never travels through the engine or its logs.

use std::path::PathBuf;

use crate::defaults::{DEFAULT_GIT_BINARY, DEFAULT_WORKERS};
use crate::error::{Error, Result};
use crate::path::is_valid_segment;

/// Configuration for one mirroring run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Account whose repositories are mirrored.
    pub account: String,
    /// Local root; repositories land in `<root>/<account>/<name>`.
    pub root: PathBuf,
    /// Include forked repositories.
    pub include_forks: bool,
    /// Clone submodules recursively.
    pub recursive: bool,
    /// Build and report tasks without touching the filesystem.
    pub dry_run: bool,
    /// Replace existing destinations instead of skipping them.
    pub overwrite: bool,
    /// Report non-zero clone exits as `CloneFailed` instead of `Cloned`.
    pub escalate_clone_failures: bool,
    /// Size of the worker pool.
    pub workers: usize,
    /// Clone binary to invoke.
    pub git_binary: PathBuf,
}

impl MirrorConfig {
    /// Creates a configuration with default policy for `account` under `root`.
    pub fn new(account: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            account: account.into(),
            root: root.into(),
            include_forks: false,
            recursive: false,
            dry_run: false,
            overwrite: false,
            escalate_clone_failures: false,
            workers: DEFAULT_WORKERS,
            git_binary: PathBuf::from(DEFAULT_GIT_BINARY),
        }
    }

    /// Checks the values that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.account.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "account must not be empty".to_string(),
            });
        }
        if !is_valid_segment(&self.account) {
            return Err(Error::InvalidConfig {
                message: format!("account '{}' is not a valid directory name", self.account),
            });
        }
        if self.root.as_os_str().is_empty() {
            return Err(Error::InvalidConfig {
                message: "destination path must not be empty".to_string(),
            });
        }
        if self.workers == 0 {
            return Err(Error::InvalidConfig {
                message: "workers must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
