//! # Repository Enumeration
//!
//! This module defines what the engine knows about a remote repository and
//! the seam through which repository lists are obtained.
//!
//! ## Design
//!
//! Listing is behind the `RepositoryLister` trait so the engine does not care
//! where descriptors come from. Two implementations ship with the crate:
//!
//! - **`GitHubLister`** (`crate::github`): pages through the GitHub REST API
//!   with an explicit token.
//! - **`ManifestLister`** (`crate::manifest`): reads descriptors from a JSON
//!   file, for offline runs and tests.
//!
//! Tests substitute their own in-memory listers to simulate authentication
//! failures or fixed repository sets without any network access.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metadata identifying one remote repository.
///
/// The serialized field names match the GitHub API (`clone_url`, `fork`), so
/// API responses and manifests deserialize into the same type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// Repository name, unique within an account.
    pub name: String,
    /// URL handed to the clone binary.
    pub clone_url: String,
    /// Whether the repository is a fork of another.
    #[serde(rename = "fork", default)]
    pub is_fork: bool,
}

impl RepositoryDescriptor {
    pub fn new(name: impl Into<String>, clone_url: impl Into<String>, is_fork: bool) -> Self {
        Self {
            name: name.into(),
            clone_url: clone_url.into(),
            is_fork,
        }
    }
}

/// Trait for repository enumeration - allows mocking in tests
pub trait RepositoryLister: Send + Sync {
    /// Returns every repository owned by `account`, in listing order.
    ///
    /// Failing here is fatal to a run: nothing has been dispatched yet, and
    /// without a list there is nothing to mirror.
    fn list(&self, account: &str) -> Result<Vec<RepositoryDescriptor>>;
}

/// Drops forks unless `include_forks` is set. Order is preserved.
pub fn filter_forks(
    descriptors: Vec<RepositoryDescriptor>,
    include_forks: bool,
) -> Vec<RepositoryDescriptor> {
    if include_forks {
        descriptors
    } else {
        descriptors.into_iter().filter(|d| !d.is_fork).collect()
    }
}
