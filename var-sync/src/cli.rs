//! CLI interface for var-sync: command parsing, argument validation and the
//! async entrypoint that wires the core pipeline together.
//!
//! All business logic (mapping model, environment resolution, the upsert
//! pipeline and reporting) lives in the `var-sync-core` crate. This module
//! is strictly CLI glue: ergonomic argument exposure and orchestration.
//!
//! ## How To Use
//! - For command-line users: run the installed `var-sync` binary with `--help`.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
//!
//! ## Extending
//! When adding subcommands, update [`Commands`] below and keep all
//! non-trivial business logic inside `var-sync-core`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use var_sync_core::{environment, plan, report, synchronise};

use crate::load_config::{load_run_config, RunConfig};

/// CLI for var-sync: push environment variables into GitLab CI/CD variables.
#[derive(Parser)]
#[clap(
    name = "var-sync",
    version,
    about = "Synchronise environment variables into GitLab projects' CI/CD variables"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upsert every mapped variable into its GitLab project
    Sync {
        /// Path to the YAML file mapping projects to their variables
        #[clap(long, value_name = "projects.yaml")]
        projects: PathBuf,
        /// Base URL of the GitLab instance hosting the v4 API
        #[clap(long, value_name = "https://gitlab.example.com")]
        api_url: String,
        /// Token permitted to update CI/CD variables in the mapped projects
        #[clap(long, value_name = "TOKEN")]
        api_token: String,
        /// Maximum number of concurrent variable operations
        #[clap(long, default_value_t = 10)]
        max_workers: usize,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main().
///
/// Returns the process exit status: `0` when every variable synchronised,
/// [`report::FAILURE_EXIT_CODE`] when any task failed. Failures before
/// fan-out (unreadable mapping file, unset source variable) surface as
/// errors instead.
pub async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Sync {
            projects,
            api_url,
            api_token,
            max_workers,
        } => {
            let config = load_run_config(&projects, api_url, api_token, max_workers)?;
            tracing::info!(command = "sync", "Starting variable synchronisation");
            sync(config).await
        }
    }
}

async fn sync(config: RunConfig) -> Result<i32> {
    let resolved = environment::resolve_source_vars(&config.projects)?;
    let tasks = plan::expand(&config.projects, &resolved)?;
    let results = synchronise::run_sync(Arc::new(config.gitlab), tasks, config.max_workers).await;
    let code = report::report(&results);
    tracing::info!("Finished var-sync");
    Ok(code)
}
