//! High-level pipeline: probe → create-or-update for every variable task,
//! fanned out across bounded concurrent workers.
//!
//! This module provides the top-level orchestration for "synchronising" all
//! expanded variable tasks against GitLab:
//!   - Probes each destination variable and branches to create or update
//!   - Runs tasks concurrently, capped by a semaphore at `max_workers`
//!   - Converts every remote failure into a [`VariableResult`] so one
//!     rejected variable never aborts the rest
//!   - Returns the full set of results once the last worker finishes
//!
//! # Callable From
//! - Used by both the CLI crate and integration tests
//! - [`upsert`] takes any [`VariableStore`] implementation, mocks included
//!
//! # Error Handling
//! [`run_sync`] itself never fails: per-task errors become failed results
//! with a message, and [`crate::report`] turns those into the exit status.
//!
//! # Navigation
//! - Main entrypoint: [`run_sync`]
//! - Per-task building blocks: [`sync_variable`], [`upsert`]

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::config::GitlabConfig;
use crate::contract::{StoreError, VariableResult, VariableStore};
use crate::gitlab::GitlabClient;
use crate::plan::ProjectVariable;

/// Create the variable when the probe reports it absent, update it otherwise.
/// Exactly one write request is issued per call.
///
/// Not a transactional upsert: another writer can change the variable's
/// existence between the probe and the write, and the write then fails or
/// overwrites accordingly. GitLab has no atomic upsert for variables, so the
/// window is accepted rather than hidden.
pub async fn upsert<S>(store: &S, variable: &ProjectVariable) -> Result<(), StoreError>
where
    S: VariableStore,
{
    if store.variable_exists(variable).await? {
        store.update_variable(variable).await
    } else {
        store.create_variable(variable).await
    }
}

/// Run one task to completion against a fresh [`GitlabClient`], converting
/// any failure into a [`VariableResult`] message.
pub async fn sync_variable(gitlab: &GitlabConfig, variable: ProjectVariable) -> VariableResult {
    let client = GitlabClient::new(gitlab);
    match upsert(&client, &variable).await {
        Ok(()) => VariableResult::ok(variable),
        Err(e) => {
            let message = e.failure_message();
            VariableResult::failed(variable, message)
        }
    }
}

/// Execute every task with at most `max_workers` variable operations in
/// flight, returning one result per task. Completion order decides result
/// order; callers must not assume it matches submission order.
pub async fn run_sync(
    gitlab: Arc<GitlabConfig>,
    tasks: Vec<ProjectVariable>,
    max_workers: usize,
) -> Vec<VariableResult> {
    info!(
        tasks_count = tasks.len(),
        max_workers, "Processing project variables"
    );

    let semaphore = Arc::new(Semaphore::new(max_workers));
    let expected = tasks.len();
    let mut workers = JoinSet::new();

    for task in tasks {
        let gitlab = Arc::clone(&gitlab);
        let semaphore = Arc::clone(&semaphore);
        workers.spawn(async move {
            // The semaphore is never closed, so acquisition only fails if the
            // runtime is tearing down; surface that as a failed result.
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return VariableResult::failed(task, format!("scheduler error: {e}")),
            };
            sync_variable(&gitlab, task).await
        });
    }

    let mut results = Vec::with_capacity(expected);
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => error!(error = %e, "Variable worker panicked"),
        }
    }
    results
}
