//! # Result Aggregation
//!
//! `ResultAggregator` consumes `DownloadResult`s as the worker pool produces
//! them, logs one line per result (`debug` for successes, `warn` for
//! failures), and finally produces a `Report` with the
//! per-outcome counts and the total wall-clock time of the run.
//!
//! Results are stored exactly as received; the aggregator never edits them.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::Serialize;

use crate::error::Result;
use crate::materialize::{serialize_seconds, DownloadResult, Outcome};

/// Accumulates results while a run is in progress.
#[derive(Debug)]
pub struct ResultAggregator {
    started: Instant,
    results: Vec<DownloadResult>,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAggregator {
    /// Starts the wall clock for the run.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            results: Vec::new(),
        }
    }

    /// Records one result and emits its log line.
    pub fn record(&mut self, result: DownloadResult) {
        let size = result
            .size_bytes
            .map(|bytes| bytes.to_string())
            .unwrap_or_else(|| "-".to_string());
        if result.outcome.is_failure() {
            warn!(
                "[{}] {} time: {:.2}s size: {}",
                result.name,
                result.outcome,
                result.elapsed_seconds(),
                size
            );
        } else {
            debug!(
                "[{}] {} time: {:.2}s size: {}",
                result.name,
                result.outcome,
                result.elapsed_seconds(),
                size
            );
        }
        if result.exit_code.is_some() || !result.removal_failures.is_empty() {
            debug!(
                "[{}] exit code: {:?}, removal failures: {:?}",
                result.name, result.exit_code, result.removal_failures
            );
        }
        self.results.push(result);
    }

    /// Number of results recorded so far.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Stops the wall clock and returns the report.
    pub fn finish(self) -> Report {
        let report = Report {
            elapsed: self.started.elapsed(),
            results: self.results,
        };
        debug!("[finish] {}", report);
        report
    }

    /// Aggregates an already available batch of results.
    pub fn collect<I>(results: I) -> Report
    where
        I: IntoIterator<Item = DownloadResult>,
    {
        let mut aggregator = Self::new();
        for result in results {
            aggregator.record(result);
        }
        aggregator.finish()
    }
}

/// Final outcome of a mirroring run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub results: Vec<DownloadResult>,
    #[serde(rename = "elapsed_seconds", serialize_with = "serialize_seconds")]
    pub elapsed: Duration,
}

impl Report {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of results with the given outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Number of results whose outcome is a failure.
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_failure()).count()
    }

    /// Sum of all measured sizes.
    pub fn total_bytes(&self) -> u64 {
        self.results.iter().filter_map(|r| r.size_bytes).sum()
    }

    /// Looks up the result for a repository by name.
    pub fn get(&self, name: &str) -> Option<&DownloadResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} repositories in {:.2}s",
            self.len(),
            self.elapsed.as_secs_f64()
        )?;
        let counts: Vec<String> = Outcome::ALL
            .iter()
            .filter_map(|&outcome| match self.count(outcome) {
                0 => None,
                n => Some(format!("{} {}", n, outcome)),
            })
            .collect();
        if !counts.is_empty() {
            write!(f, " ({})", counts.join(", "))?;
        }
        write!(f, ", {} bytes on disk", self.total_bytes())
    }
}
