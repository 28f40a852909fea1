//! Destination path resolution for mirrored repositories

use std::path::{Path, PathBuf};

/// Resolve the local destination of a repository: `<root>/<account>/<repo_name>`.
///
/// Pure and deterministic. The skip/overwrite decision relies on repeated runs
/// landing on the same path.
pub fn resolve(root: &Path, account: &str, repo_name: &str) -> PathBuf {
    root.join(account).join(repo_name)
}

/// Whether `name` can be used as a single path segment.
///
/// Only such names keep `resolve` inside `<root>/<account>` and give distinct
/// names distinct destinations. Empty names, `.`, `..` and anything holding a
/// path separator are rejected.
pub fn is_valid_segment(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
