//! # Safe Tree Removal
//!
//! Removes an existing working copy before it is cloned again. Trees produced
//! by a clone may contain write-protected entries (pack files and object
//! directories are read-only on some platforms), and a previous interrupted
//! run may have left a tree half populated, so a plain `remove_dir_all` is not
//! enough.
//!
//! Removal is two-phase per entry: clear write protection, then delete. It is
//! best-effort: a failure on one entry is recorded and removal continues with
//! its siblings. The root directory is removed last; if anything below it
//! survived, that final step fails and the caller receives an
//! `Error::Removal` carrying every collected failure.
//!
//! The root is inspected without following links. A symlinked root is
//! unlinked and its target never walked; a root that is not a directory is
//! refused before anything about it changes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error};
use serde::Serialize;

use crate::error::{Error, Result};

/// One entry that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalFailure {
    pub path: PathBuf,
    pub message: String,
}

impl RemovalFailure {
    fn new(path: &Path, err: &io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Summary of a completed removal.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    /// Files, symlinks and directories deleted, the root included.
    pub entries_removed: usize,
    /// Entries that could not be deleted. Empty whenever the root was removed
    /// cleanly, kept for callers that tolerate leftovers.
    pub failures: Vec<RemovalFailure>,
}

/// Recursively remove `directory`, clearing write protection as needed.
///
/// Returns `Ok` only if `directory` itself is gone. Any per-entry failures
/// are collected rather than aborting the walk.
///
/// A symlink at `directory` is unlinked, its target is left alone. Anything
/// else that is not a directory is an error and is left unchanged.
pub fn remove_tree(directory: &Path) -> Result<RemovalReport> {
    let mut report = RemovalReport::default();

    let file_type = fs::symlink_metadata(directory)
        .map_err(|e| removal_error(directory, e.to_string()))?
        .file_type();
    if file_type.is_symlink() {
        remove_entry(directory, true).map_err(|e| removal_error(directory, e.to_string()))?;
        debug!("Unlinked {}", directory.display());
        report.entries_removed = 1;
        return Ok(report);
    }
    if !file_type.is_dir() {
        return Err(removal_error(directory, "not a directory".to_string()));
    }

    clear_write_protection(directory, true)
        .map_err(|e| removal_error(directory, e.to_string()))?;

    if let Err(e) = remove_contents(directory, &mut report) {
        return Err(Error::Removal {
            path: directory.to_path_buf(),
            message: e.to_string(),
            failures: report.failures,
        });
    }

    match fs::remove_dir(directory) {
        Ok(()) => {
            report.entries_removed += 1;
            debug!(
                "Removed {} ({} entries)",
                directory.display(),
                report.entries_removed
            );
            Ok(report)
        }
        Err(e) => Err(Error::Removal {
            path: directory.to_path_buf(),
            message: e.to_string(),
            failures: report.failures,
        }),
    }
}

fn removal_error(path: &Path, message: String) -> Error {
    Error::Removal {
        path: path.to_path_buf(),
        message,
        failures: Vec::new(),
    }
}

/// Delete every child of `dir`. Only an unreadable `dir` is an error; child
/// failures are pushed onto `report.failures`.
fn remove_contents(dir: &Path, report: &mut RemovalReport) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                report.failures.push(RemovalFailure::new(dir, &e));
                continue;
            }
        };
        let path = entry.path();

        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                report.failures.push(RemovalFailure::new(&path, &e));
                continue;
            }
        };

        if file_type.is_dir() {
            if let Err(e) = remove_subtree(&path, report) {
                error!("Error {} while removing {}", e, path.display());
                report.failures.push(RemovalFailure::new(&path, &e));
            }
        } else if let Err(e) = remove_entry(&path, file_type.is_symlink()) {
            report.failures.push(RemovalFailure::new(&path, &e));
        } else {
            report.entries_removed += 1;
        }
    }
    Ok(())
}

fn remove_subtree(dir: &Path, report: &mut RemovalReport) -> io::Result<()> {
    clear_write_protection(dir, true)?;
    remove_contents(dir, report)?;
    fs::remove_dir(dir)?;
    report.entries_removed += 1;
    Ok(())
}

fn remove_entry(path: &Path, is_symlink: bool) -> io::Result<()> {
    // Permissions on a symlink are those of its target; leave them alone.
    if !is_symlink {
        clear_write_protection(path, false)?;
    }
    match fs::remove_file(path) {
        // Windows directory symlinks and junctions are removed as directories.
        Err(e) if is_symlink && cfg!(windows) => fs::remove_dir(path).map_err(|_| e),
        other => other,
    }
}

#[cfg(unix)]
fn clear_write_protection(path: &Path, is_dir: bool) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::symlink_metadata(path)?.permissions();
    let wanted = if is_dir { 0o700 } else { 0o600 };
    let mode = permissions.mode();
    if mode & wanted != wanted {
        permissions.set_mode(mode | wanted);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn clear_write_protection(path: &Path, _is_dir: bool) -> io::Result<()> {
    let mut permissions = fs::symlink_metadata(path)?.permissions();
    if permissions.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }
    Ok(())
}
