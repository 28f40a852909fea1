//! Common test utilities for integration and end-to-end tests.
//!
//! This module provides shared helpers used across the integration test
//! files: local source repositories created with the real `git` binary,
//! manifests pointing at them, and a mirror root to clone into.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     if should_skip_git_tests() {
//!         return;
//!     }
//!     let fixture = MirrorFixture::new().with_source("tools");
//!     fixture.command().arg("--user").arg(ACCOUNT).assert().success();
//! }
//! ```

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use assert_fs::prelude::*;
use repo_mirror::repository::RepositoryDescriptor;

/// Re-exports for convenient test imports.
pub mod prelude {
    pub use super::{should_skip_git_tests, MirrorFixture, ACCOUNT};
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;
}

/// Account name used by every fixture.
pub const ACCOUNT: &str = "octocat";

/// Check if tests that need a working `git` binary should be skipped.
///
/// Returns `true` if `SKIP_GIT_TESTS` is set or `git --version` cannot run.
pub fn should_skip_git_tests() -> bool {
    if std::env::var("SKIP_GIT_TESTS").is_ok() {
        return true;
    }
    let available = Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);
    if !available {
        eprintln!("git not available, skipping");
    }
    !available
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A temporary directory holding local source repositories, a manifest
/// describing them and an empty mirror root.
pub struct MirrorFixture {
    temp_dir: assert_fs::TempDir,
    descriptors: Vec<RepositoryDescriptor>,
}

impl MirrorFixture {
    /// Create a fixture with no source repositories.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("sources")
            .create_dir_all()
            .expect("Failed to create sources directory");
        Self {
            temp_dir,
            descriptors: Vec::new(),
        }
    }

    /// Add a source repository with one commit.
    pub fn with_source(self, name: &str) -> Self {
        self.with_repository(name, false)
    }

    /// Add a source repository flagged as a fork.
    pub fn with_fork(self, name: &str) -> Self {
        self.with_repository(name, true)
    }

    fn with_repository(mut self, name: &str, is_fork: bool) -> Self {
        let source = self.temp_dir.child("sources").child(name);
        source
            .child("README.md")
            .write_str(&format!("# {}\n\nMirrored in tests.\n", name))
            .expect("Failed to write README");
        let dir = source.path();
        git(dir, &["init", "--quiet"]);
        git(dir, &["add", "README.md"]);
        git(
            dir,
            &[
                "-c",
                "user.name=Mirror Tests",
                "-c",
                "user.email=tests@example.com",
                "commit",
                "--quiet",
                "-m",
                "initial",
            ],
        );
        self.descriptors.push(RepositoryDescriptor::new(
            name,
            dir.to_string_lossy(),
            is_fork,
        ));
        self
    }

    /// Add a descriptor whose clone URL does not exist.
    pub fn with_missing_source(mut self, name: &str) -> Self {
        let url = self.temp_dir.path().join("sources").join("does-not-exist");
        self.descriptors
            .push(RepositoryDescriptor::new(name, url.to_string_lossy(), false));
        self
    }

    /// Descriptors for every source added so far.
    pub fn descriptors(&self) -> Vec<RepositoryDescriptor> {
        self.descriptors.clone()
    }

    /// Write the manifest and return its path.
    pub fn manifest_path(&self) -> PathBuf {
        let manifest = self.temp_dir.child("manifest.json");
        manifest
            .write_str(
                &serde_json::to_string_pretty(&self.descriptors)
                    .expect("Failed to serialize manifest"),
            )
            .expect("Failed to write manifest");
        manifest.path().to_path_buf()
    }

    /// Root the mirror clones into.
    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("mirror")
    }

    /// Where a repository of the fixture account ends up.
    pub fn destination(&self, name: &str) -> PathBuf {
        self.root().join(ACCOUNT).join(name)
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a command that mirrors this fixture's manifest into its root.
    ///
    /// The token variable is removed so the host environment never leaks in.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repo-mirror");
        cmd.current_dir(self.path())
            .env_remove("GITHUBAPITOKEN")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .arg("--user")
            .arg(ACCOUNT)
            .arg("--path")
            .arg(self.root())
            .arg("--manifest")
            .arg(self.manifest_path());
        cmd
    }
}

impl Default for MirrorFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = MirrorFixture::new();
        assert!(fixture.path().join("sources").is_dir());
        assert!(!fixture.root().exists());
    }

    #[test]
    fn test_manifest_round_trips_descriptors() {
        let fixture = MirrorFixture::new().with_missing_source("gone");
        let content = std::fs::read_to_string(fixture.manifest_path()).unwrap();
        let parsed = repo_mirror::manifest::parse(&content).unwrap();
        assert_eq!(parsed, fixture.descriptors());
    }
}
