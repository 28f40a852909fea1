//! Property-based tests for destination path resolution.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{is_valid_segment, resolve};
    use proptest::prelude::*;
    use std::path::Path;

    // Repository and account names as the hosting platform allows them.
    const NAME: &str = "[A-Za-z0-9._-]{1,40}";

    proptest! {
        /// Property: resolve is deterministic (same input = same output)
        #[test]
        fn resolve_is_deterministic(account in NAME, repo in NAME) {
            let root = Path::new("/mirror");
            prop_assert_eq!(resolve(root, &account, &repo), resolve(root, &account, &repo));
        }

        /// Property: the destination always lives under the root
        #[test]
        fn resolve_stays_under_root(account in NAME, repo in NAME) {
            let root = Path::new("/mirror");
            let path = resolve(root, &account, &repo);
            prop_assert!(path.starts_with(root));
            prop_assert!(path.starts_with(root.join(&account)));
        }

        /// Property: distinct repository names never share a destination
        #[test]
        fn resolve_is_disjoint_for_distinct_names(
            account in NAME,
            a in NAME,
            b in NAME,
        ) {
            prop_assume!(a != b);
            let root = Path::new("/mirror");
            prop_assert_ne!(resolve(root, &account, &a), resolve(root, &account, &b));
        }

        /// Property: a valid name lands directly inside the account directory
        #[test]
        fn valid_names_resolve_to_account_children(account in NAME, repo in NAME) {
            prop_assume!(is_valid_segment(&account) && is_valid_segment(&repo));
            let root = Path::new("/mirror");
            let account_dir = root.join(&account);
            let path = resolve(root, &account, &repo);
            prop_assert_eq!(path.parent(), Some(account_dir.as_path()));
        }

        /// Property: names with a separator are never valid
        #[test]
        fn names_with_separators_are_invalid(a in NAME, b in NAME, sep in "[/\\\\]") {
            let name = format!("{}{}{}", a, sep, b);
            prop_assert!(!is_valid_segment(&name));
        }

        /// Property: the last component is the repository name
        #[test]
        fn resolve_ends_with_repo_name(account in NAME, repo in "[A-Za-z0-9_-][A-Za-z0-9._-]{0,39}") {
            let path = resolve(Path::new("/mirror"), &account, &repo);
            prop_assert_eq!(
                path.file_name().map(|n| n.to_string_lossy().into_owned()),
                Some(repo.clone())
            );
        }
    }
}
