//! # Error Handling
//!
//! This module defines the centralized error type for the `repo-mirror`
//! library. It uses `thiserror` to build a single `Error` enum covering every
//! failure that can escape a library call, and a `Result<T>` alias used
//! throughout the crate.
//!
//! Only a few of these are fatal to a run: listing failures (authentication,
//! unknown account, API errors, unreadable manifests) and invalid
//! configuration. Failures that happen inside a single repository's task are
//! folded into that task's `DownloadResult` instead of being returned as an
//! `Error`; `Error::Removal` is the one per-task error the materializer
//! inspects before converting it into a `RemovalFailed` outcome.

use std::path::PathBuf;

use thiserror::Error;

use crate::remove::RemovalFailure;

/// Main error type for repo-mirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// The API rejected the credential, or no credential was supplied.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The account to mirror does not exist on the platform.
    #[error("Account not found: {account}")]
    AccountNotFound { account: String },

    /// Any other failure while talking to the repository listing API.
    #[error("API request failed for {url}: {message}")]
    Api { url: String, message: String },

    /// The repository manifest could not be read or parsed.
    #[error("Manifest error in {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    /// A directory tree could not be fully removed.
    ///
    /// `failures` holds every per-entry failure collected before the final
    /// step gave up, so callers can report them alongside the outcome.
    #[error("Failed to remove {}: {message}{}", path.display(), format_failures(failures))]
    Removal {
        path: PathBuf,
        message: String,
        failures: Vec<RemovalFailure>,
    },

    /// The worker thread pool could not be created.
    #[error("Worker pool error: {message}")]
    WorkerPool { message: String },

    /// The run configuration is unusable.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_failures(failures: &[RemovalFailure]) -> String {
    if failures.is_empty() {
        String::new()
    } else {
        format!(" ({} entries could not be removed)", failures.len())
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
