//! # Bounded Worker Pool
//!
//! Runs one materialization per task on a fixed-size `rayon` thread pool.
//! Every task is submitted up front; each worker runs one task to completion
//! (including the blocking clone subprocess) before it takes the next, so at
//! most `concurrency` tasks are ever in flight.
//!
//! Results flow back over a channel and are handed to the caller on the
//! calling thread as they complete, in completion order. A panic inside one
//! task is contained: it becomes a `CloneFailed` result for that repository
//! and the rest of the pool carries on, so every task yields exactly one
//! result.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, error};
use rayon::ThreadPoolBuilder;

use crate::error::{Error, Result};
use crate::materialize::{DownloadResult, DownloadTask, Materialize, Outcome};

/// A fixed-size pool of materialization workers.
pub struct WorkerPool {
    concurrency: usize,
    materializer: Arc<dyn Materialize>,
}

impl WorkerPool {
    /// Creates a pool of `concurrency` workers. `concurrency` must be at least 1.
    pub fn new(concurrency: usize, materializer: Arc<dyn Materialize>) -> Result<Self> {
        if concurrency == 0 {
            return Err(Error::InvalidConfig {
                message: "worker pool needs at least one worker".to_string(),
            });
        }
        Ok(Self {
            concurrency,
            materializer,
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs every task and returns the results in completion order.
    pub fn run(&self, tasks: Vec<DownloadTask>) -> Result<Vec<DownloadResult>> {
        let mut results = Vec::with_capacity(tasks.len());
        self.run_with(tasks, |result| results.push(result))?;
        Ok(results)
    }

    /// Runs every task, handing each result to `on_result` as soon as it is
    /// available. Blocks until all tasks have finished and returns how many
    /// results were delivered.
    pub fn run_with<F>(&self, tasks: Vec<DownloadTask>, mut on_result: F) -> Result<usize>
    where
        F: FnMut(DownloadResult),
    {
        if tasks.is_empty() {
            return Ok(0);
        }

        let workers = self.concurrency.min(tasks.len());
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("mirror-worker-{}", index))
            .build()
            .map_err(|e| Error::WorkerPool {
                message: e.to_string(),
            })?;
        debug!("Dispatching {} tasks to {} workers", tasks.len(), workers);

        let (sender, receiver) = mpsc::channel();
        for task in tasks {
            let sender = sender.clone();
            let materializer = Arc::clone(&self.materializer);
            pool.spawn_fifo(move || {
                let result = run_isolated(materializer.as_ref(), task);
                // The receiver outlives every worker; a send can only fail if
                // the caller's thread is already unwinding.
                let _ = sender.send(result);
            });
        }
        // Only the workers hold senders now, so the channel closes once the
        // last task has reported.
        drop(sender);

        let mut delivered = 0;
        for result in receiver {
            on_result(result);
            delivered += 1;
        }
        Ok(delivered)
    }
}

/// Runs one task, converting a panic into a failed result.
fn run_isolated(materializer: &dyn Materialize, task: DownloadTask) -> DownloadResult {
    let start = Instant::now();
    let name = task.descriptor.name.clone();
    match panic::catch_unwind(AssertUnwindSafe(|| materializer.materialize(task))) {
        Ok(result) => result,
        Err(payload) => {
            error!("[{}] worker panicked: {}", name, panic_message(&*payload));
            DownloadResult::new(name, Outcome::CloneFailed, start.elapsed())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
