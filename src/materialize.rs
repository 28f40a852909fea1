//! # Materialization
//!
//! Turns one `DownloadTask` into one `DownloadResult`: decide whether the
//! repository should be skipped, cloned, or removed and cloned again, carry
//! out that decision, and measure how long it took and how much ended up on
//! disk.
//!
//! ## Decision table
//!
//! | destination | overwrite | dry run | action                                   |
//! |-------------|-----------|---------|------------------------------------------|
//! | any         | any       | yes     | `DryRun`, no filesystem access           |
//! | missing     | any       | no      | clone, `Cloned`                          |
//! | exists      | yes       | no      | remove tree, clone, `Overwritten`        |
//! | exists      | no        | no      | `Skipped`                                |
//!
//! "Exists" is checked without following links, so a symlink at the
//! destination counts as existing and overwrite replaces the link, not its
//! target. A removal that fails yields `RemovalFailed` and no clone is
//! attempted.
//!
//! Clone failures are observed, not escalated: a clone process that exits
//! non-zero still yields `Cloned`/`Overwritten` with its exit code recorded,
//! unless `escalate_clone_failures` is set, in which case it yields
//! `CloneFailed`. A clone binary that cannot be started always yields
//! `CloneFailed`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{Serialize, Serializer};
use walkdir::WalkDir;

use crate::error::Error;
use crate::git::{failure_hint, CloneRunner};
use crate::remove::{remove_tree, RemovalFailure};
use crate::repository::RepositoryDescriptor;

/// One unit of work: materialize `descriptor` at `destination`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub descriptor: RepositoryDescriptor,
    pub destination: PathBuf,
    pub recursive: bool,
    pub overwrite: bool,
    pub dry_run: bool,
}

/// How a task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Destination was missing and the clone step ran.
    Cloned,
    /// Destination existed and overwrite was off.
    Skipped,
    /// Destination existed, was removed, and the clone step ran.
    Overwritten,
    /// Dry run; nothing was touched.
    DryRun,
    /// The existing destination could not be removed; no clone was attempted.
    RemovalFailed,
    /// The clone binary could not be run, or exited non-zero with escalation on.
    CloneFailed,
}

impl Outcome {
    pub const ALL: [Outcome; 6] = [
        Outcome::Cloned,
        Outcome::Overwritten,
        Outcome::Skipped,
        Outcome::DryRun,
        Outcome::RemovalFailed,
        Outcome::CloneFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Cloned => "cloned",
            Outcome::Skipped => "skipped",
            Outcome::Overwritten => "overwritten",
            Outcome::DryRun => "dry-run",
            Outcome::RemovalFailed => "removal-failed",
            Outcome::CloneFailed => "clone-failed",
        }
    }

    /// Whether this outcome means the repository was not mirrored as intended.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::RemovalFailed | Outcome::CloneFailed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record produced for every task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadResult {
    pub name: String,
    pub size_bytes: Option<u64>,
    #[serde(rename = "elapsed_seconds", serialize_with = "serialize_seconds")]
    pub elapsed: Duration,
    pub outcome: Outcome,
    /// Exit code of the clone process, when one ran and exited normally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Entries the removal step could not delete.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removal_failures: Vec<RemovalFailure>,
}

impl DownloadResult {
    pub fn new(name: impl Into<String>, outcome: Outcome, elapsed: Duration) -> Self {
        Self {
            name: name.into(),
            size_bytes: None,
            elapsed,
            outcome,
            exit_code: None,
            removal_failures: Vec::new(),
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

pub(crate) fn serialize_seconds<S: Serializer>(
    elapsed: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

/// Anything that can turn a task into a result. The worker pool is generic
/// over this so tests can observe scheduling without running clones.
pub trait Materialize: Send + Sync {
    fn materialize(&self, task: DownloadTask) -> DownloadResult;
}

/// The production materializer, cloning through a `CloneRunner`.
pub struct Materializer<R: CloneRunner> {
    runner: R,
    escalate_clone_failures: bool,
}

impl<R: CloneRunner> Materializer<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            escalate_clone_failures: false,
        }
    }

    /// Report non-zero clone exits as `CloneFailed`.
    pub fn escalate_clone_failures(mut self, escalate: bool) -> Self {
        self.escalate_clone_failures = escalate;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs the clone step and fills in outcome, exit code and size.
    fn clone_into(&self, task: &DownloadTask, success: Outcome, result: &mut DownloadResult) {
        let name = &task.descriptor.name;
        match self
            .runner
            .clone_repo(&task.descriptor.clone_url, &task.destination, task.recursive)
        {
            Ok(status) => {
                result.exit_code = status.code;
                if status.success() {
                    result.outcome = success;
                } else {
                    match failure_hint(&status.stderr) {
                        Some(hint) => warn!(
                            "[{}] clone exited with {:?}: {} (hint: {})",
                            name, status.code, status.stderr, hint
                        ),
                        None => warn!(
                            "[{}] clone exited with {:?}: {}",
                            name, status.code, status.stderr
                        ),
                    }
                    result.outcome = if self.escalate_clone_failures {
                        Outcome::CloneFailed
                    } else {
                        success
                    };
                }
                result.size_bytes = dir_size(&task.destination);
            }
            Err(e) => {
                warn!("[{}] could not start clone: {}", name, e);
                result.outcome = Outcome::CloneFailed;
                result.size_bytes = dir_size(&task.destination);
            }
        }
    }
}

impl<R: CloneRunner> Materialize for Materializer<R> {
    fn materialize(&self, task: DownloadTask) -> DownloadResult {
        let start = Instant::now();
        let name = task.descriptor.name.clone();
        debug!("[{}] materializing into {}", name, task.destination.display());

        // Dry run wins over everything else, before any filesystem access.
        if task.dry_run {
            debug!(
                "[{}] dry run set, not downloading to {}",
                name,
                task.destination.display()
            );
            return DownloadResult::new(name, Outcome::DryRun, start.elapsed());
        }

        let mut result = DownloadResult::new(name, Outcome::Cloned, Duration::ZERO);

        // A symlink (even a dangling one) occupies the destination.
        let occupied = fs::symlink_metadata(&task.destination).is_ok();
        if !occupied {
            self.clone_into(&task, Outcome::Cloned, &mut result);
        } else if task.overwrite {
            debug!(
                "[{}] {} exists, overwriting",
                result.name,
                task.destination.display()
            );
            match remove_tree(&task.destination) {
                Ok(report) => {
                    result.removal_failures = report.failures;
                    self.clone_into(&task, Outcome::Overwritten, &mut result);
                }
                Err(Error::Removal {
                    message, failures, ..
                }) => {
                    warn!(
                        "[{}] could not remove {}: {}",
                        result.name,
                        task.destination.display(),
                        message
                    );
                    result.outcome = Outcome::RemovalFailed;
                    result.removal_failures = failures;
                }
                Err(e) => {
                    warn!(
                        "[{}] could not remove {}: {}",
                        result.name,
                        task.destination.display(),
                        e
                    );
                    result.outcome = Outcome::RemovalFailed;
                }
            }
        } else {
            debug!(
                "[{}] {} already exists, skipping",
                result.name,
                task.destination.display()
            );
            result.outcome = Outcome::Skipped;
        }

        result.elapsed = start.elapsed();
        debug!(
            "[{}] done: {} in {:.2}s, size {:?}",
            result.name,
            result.outcome,
            result.elapsed_seconds(),
            result.size_bytes
        );
        result
    }
}

/// Total byte length of every regular file under `root`.
///
/// Symlinks are not followed and unreadable entries are skipped. Returns
/// `None` when `root` does not exist or cannot be read at all.
pub fn dir_size(root: &Path) -> Option<u64> {
    if !root.is_dir() {
        return None;
    }
    let total = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum();
    Some(total)
}
