//! Repository lists read from a JSON manifest instead of the API.
//!
//! The manifest is a JSON array of descriptors using the API's field names:
//!
//! ```json
//! [
//!   { "name": "tools", "clone_url": "https://github.com/octocat/tools.git", "fork": false }
//! ]
//! ```
//!
//! The same array can be saved straight from the API response, which makes
//! re-running a mirror offline (or against local bare repositories) easy.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::repository::{RepositoryDescriptor, RepositoryLister};

/// Lists repositories from a manifest file. The account argument is ignored;
/// a manifest describes exactly one account.
#[derive(Debug, Clone)]
pub struct ManifestLister {
    path: PathBuf,
}

impl ManifestLister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RepositoryLister for ManifestLister {
    fn list(&self, account: &str) -> Result<Vec<RepositoryDescriptor>> {
        let content = fs::read_to_string(&self.path).map_err(|e| Error::Manifest {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let repos = parse(&content).map_err(|e| Error::Manifest {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        debug!(
            "[{}] {} repos from {}",
            account,
            repos.len(),
            self.path.display()
        );
        Ok(repos)
    }
}

/// Parses a manifest document.
pub fn parse(content: &str) -> serde_json::Result<Vec<RepositoryDescriptor>> {
    serde_json::from_str(content)
}
