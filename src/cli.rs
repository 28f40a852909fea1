//! CLI argument parsing and run dispatch

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use repo_mirror::config::MirrorConfig;
use repo_mirror::defaults::{DEFAULT_API_URL, DEFAULT_GIT_BINARY, DEFAULT_WORKERS, TOKEN_ENV_VAR};
use repo_mirror::github::GitHubLister;
use repo_mirror::manifest::ManifestLister;
use repo_mirror::materialize::Outcome;
use repo_mirror::orchestrator::{default_materializer, mirror};
use repo_mirror::output::{outcome_marker, result_line, OutputConfig};
use repo_mirror::repository::RepositoryLister;

/// Repository Mirror - Clone every repository of a GitHub account
#[derive(Parser, Debug)]
#[command(name = "repo-mirror")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Account whose repositories are mirrored
    #[arg(long, value_name = "ACCOUNT")]
    user: String,

    /// Root directory; repositories land in <PATH>/<ACCOUNT>/<REPO>
    #[arg(long, visible_alias = "destpath", value_name = "PATH")]
    path: PathBuf,

    /// Include forked repositories
    #[arg(long)]
    forks: bool,

    /// Clone submodules recursively
    #[arg(long)]
    recursive: bool,

    /// List what would be done without cloning or removing anything
    #[arg(long)]
    nodl: bool,

    /// Remove and re-clone repositories that already exist locally
    #[arg(long)]
    overwrite: bool,

    /// Verbose per-repository logging
    #[arg(long)]
    debug: bool,

    /// Number of repositories cloned concurrently
    #[arg(long, value_name = "N", default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Clone binary to invoke
    #[arg(long = "git", value_name = "PATH", default_value = DEFAULT_GIT_BINARY)]
    git_binary: PathBuf,

    /// API token used to list repositories
    #[arg(long, value_name = "TOKEN", env = TOKEN_ENV_VAR, hide_env_values = true)]
    token: Option<String>,

    /// Base URL of the GitHub API
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Read the repository list from a JSON manifest instead of the API
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Report clones that exit non-zero as failed instead of cloned
    #[arg(long)]
    fail_on_clone_error: bool,

    /// Write the final report as JSON to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LevelFilter,
}

impl Cli {
    /// Execute the mirroring run
    pub fn execute(self) -> Result<()> {
        self.init_logging();

        let config = self.mirror_config();
        let lister = self.lister()?;
        let output = OutputConfig::from_env_and_flag(&self.color);

        let report = mirror(
            &config,
            lister.as_ref(),
            default_materializer(&config),
            |result| println!("{}", result_line(&output, result)),
        )
        .with_context(|| format!("Failed to mirror repositories of '{}'", config.account))?;

        let marker = if report.failures() > 0 {
            outcome_marker(&output, Outcome::CloneFailed)
        } else {
            outcome_marker(&output, Outcome::Cloned)
        };
        println!("{} {}", marker, report);

        if let Some(path) = &self.report {
            report
                .write_json(path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            log::info!("Report written to {}", path.display());
        }

        Ok(())
    }

    fn init_logging(&self) {
        let level = if self.debug {
            LevelFilter::Debug.max(self.log_level)
        } else {
            self.log_level
        };
        // RUST_LOG, when set, overrides the flags.
        let _ = env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .format_timestamp(None)
            .try_init();
    }

    fn mirror_config(&self) -> MirrorConfig {
        let mut config = MirrorConfig::new(self.user.clone(), self.path.clone());
        config.include_forks = self.forks;
        config.recursive = self.recursive;
        config.dry_run = self.nodl;
        config.overwrite = self.overwrite;
        config.escalate_clone_failures = self.fail_on_clone_error;
        config.workers = self.workers;
        config.git_binary = self.git_binary.clone();
        config
    }

    fn lister(&self) -> Result<Box<dyn RepositoryLister>> {
        match &self.manifest {
            Some(path) => Ok(Box::new(ManifestLister::new(path))),
            None => {
                let lister = GitHubLister::new(&self.api_url, self.token.clone())
                    .context("Failed to set up the GitHub client")?;
                Ok(Box::new(lister))
            }
        }
    }
}
