//! Default values for repo-mirror configuration.
//!
//! This module provides centralized default values used by the CLI and the
//! library, ensuring consistency and avoiding duplication.

/// Number of repositories materialized concurrently when `--workers` is not given.
pub const DEFAULT_WORKERS: usize = 10;

/// The version-control binary invoked for clones.
pub const DEFAULT_GIT_BINARY: &str = "git";

/// Base URL of the GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Environment variable holding the API token.
pub const TOKEN_ENV_VAR: &str = "GITHUBAPITOKEN";

/// Page size requested from the repository listing API (the API maximum).
pub const LISTING_PAGE_SIZE: usize = 100;

/// User agent sent with API requests; GitHub rejects requests without one.
pub fn user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
