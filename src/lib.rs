//! # Repository Mirror Library
//!
//! This library mirrors every repository owned by a GitHub account onto local
//! disk. It is designed to be used by the `repo-mirror` command-line tool but
//! can be embedded in other backup tooling as well.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use repo_mirror::config::MirrorConfig;
//! use repo_mirror::github::GitHubLister;
//! use repo_mirror::orchestrator::{default_materializer, mirror};
//!
//! let mut config = MirrorConfig::new("octocat", "/srv/backup");
//! config.overwrite = true;
//!
//! let lister = GitHubLister::github(std::env::var("GITHUBAPITOKEN").ok()).unwrap();
//! let report = mirror(&config, &lister, default_materializer(&config), |_| {}).unwrap();
//! println!("{}", report);
//! ```
//!
//! ## Core Concepts
//!
//! - **Listing (`repository`, `github`, `manifest`)**: Enumerates the
//!   account's repositories behind the `RepositoryLister` trait.
//! - **Path resolution (`path`)**: Maps each repository to
//!   `<root>/<account>/<name>`.
//! - **Safe removal (`remove`)**: Tears down an existing, possibly read-only
//!   working copy before it is replaced.
//! - **Materialization (`materialize`, `git`)**: Decides between skip, clone,
//!   overwrite and dry run for one repository and runs `git clone`.
//! - **Worker pool (`pool`)**: Runs materializations on a bounded thread pool.
//! - **Reporting (`report`, `output`)**: Collects results into a final report.
//!
//! ## Execution Flow
//!
//! `orchestrator::mirror` lists the repositories, filters out forks, builds one
//! task per repository and streams the pool's results into the report. Only
//! listing and configuration failures abort a run; everything that goes wrong
//! for an individual repository ends up in its result.

pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod github;
pub mod manifest;
pub mod materialize;
pub mod orchestrator;
pub mod output;
pub mod path;
pub mod pool;
pub mod remove;
pub mod report;
pub mod repository;

#[cfg(test)]
mod path_proptest;
