//! # Mirroring Orchestrator
//!
//! Runs one complete mirroring pass:
//!
//! 1.  **Listing**: ask the `RepositoryLister` for the account's repositories.
//!     Any failure here (authentication included) aborts the run before a
//!     single task is dispatched.
//! 2.  **Filtering**: drop forks unless they were requested.
//! 3.  **Task building**: resolve one destination per repository and attach
//!     the run's policy flags.
//! 4.  **Dispatch**: hand every task to the `WorkerPool`, streaming results
//!     into the `ResultAggregator` as they complete.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::MirrorConfig;
use crate::error::Result;
use crate::git::GitCommand;
use crate::materialize::{DownloadResult, DownloadTask, Materialize, Materializer};
use crate::path::{is_valid_segment, resolve};
use crate::pool::WorkerPool;
use crate::report::{Report, ResultAggregator};
use crate::repository::{filter_forks, RepositoryDescriptor, RepositoryLister};

/// Builds one task per descriptor.
///
/// Every task must own a distinct subtree of `<root>/<account>`. Names that
/// are not a single path segment (empty, `.`, `..`, or containing a
/// separator) would resolve outside it and are dropped. Descriptors sharing a
/// name would map to the same destination; only the first is kept.
pub fn build_tasks(
    descriptors: Vec<RepositoryDescriptor>,
    config: &MirrorConfig,
) -> Vec<DownloadTask> {
    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        if !is_valid_segment(&descriptor.name) {
            warn!(
                "[{:?}] repository name is not a valid directory name, ignoring {}",
                descriptor.name, descriptor.clone_url
            );
            continue;
        }
        if !seen.insert(descriptor.name.clone()) {
            warn!(
                "[{}] duplicate repository name in listing, ignoring {}",
                descriptor.name, descriptor.clone_url
            );
            continue;
        }
        let destination = resolve(&config.root, &config.account, &descriptor.name);
        tasks.push(DownloadTask {
            descriptor,
            destination,
            recursive: config.recursive,
            overwrite: config.overwrite,
            dry_run: config.dry_run,
        });
    }
    tasks
}

/// The materializer a run uses unless a caller supplies its own.
pub fn default_materializer(config: &MirrorConfig) -> Arc<dyn Materialize> {
    Arc::new(
        Materializer::new(GitCommand::new(&config.git_binary))
            .escalate_clone_failures(config.escalate_clone_failures),
    )
}

/// Mirrors every repository of `config.account`.
///
/// `on_result` sees each result as soon as its task finishes, before it is
/// added to the report.
pub fn mirror<F>(
    config: &MirrorConfig,
    lister: &dyn RepositoryLister,
    materializer: Arc<dyn Materialize>,
    mut on_result: F,
) -> Result<Report>
where
    F: FnMut(&DownloadResult),
{
    config.validate()?;

    let descriptors = lister.list(&config.account)?;
    let listed = descriptors.len();
    let descriptors = filter_forks(descriptors, config.include_forks);
    if descriptors.len() != listed {
        debug!(
            "[{}] skipping {} forks",
            config.account,
            listed - descriptors.len()
        );
    }

    let tasks = build_tasks(descriptors, config);
    info!(
        "[{}] {} repos -> {}",
        config.account,
        tasks.len(),
        config.root.join(&config.account).display()
    );

    let pool = WorkerPool::new(config.workers, materializer)?;
    let mut aggregator = ResultAggregator::new();
    pool.run_with(tasks, |result| {
        on_result(&result);
        aggregator.record(result);
    })?;

    Ok(aggregator.finish())
}
