//! Contract between the upsert pipeline and the variable store backend.
//!
//! The pipeline only ever talks to a [`VariableStore`]; the real GitLab
//! client in [`crate::gitlab`] and the generated test mocks both implement
//! it, so branching logic is testable without a network.

use async_trait::async_trait;
use thiserror::Error;

use crate::plan::ProjectVariable;

/// Failure of a single remote variable operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The API answered a create or update with a non-success status.
    #[error("gitlab api returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    /// Transport-level failure: connect, send or body decode.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl StoreError {
    /// Failure detail for a [`VariableResult`] message.
    ///
    /// API rejections surface the response body verbatim, since GitLab puts
    /// the actionable detail there; an empty body falls back to the status
    /// line so a failed result always carries a message.
    pub fn failure_message(&self) -> String {
        match self {
            StoreError::Api { status, body } => {
                if body.is_empty() {
                    format!("gitlab api returned {status}")
                } else {
                    body.clone()
                }
            }
            other => other.to_string(),
        }
    }
}

/// Outcome record for one attempted variable task. Failures are data, not
/// errors: one rejected variable must not abort the others.
#[derive(Debug, Clone)]
pub struct VariableResult {
    pub variable: ProjectVariable,
    pub success: bool,
    /// Empty on success, failure detail otherwise.
    pub message: String,
}

impl VariableResult {
    pub fn ok(variable: ProjectVariable) -> Self {
        Self {
            variable,
            success: true,
            message: String::new(),
        }
    }

    pub fn failed(variable: ProjectVariable, message: String) -> Self {
        Self {
            variable,
            success: false,
            message,
        }
    }
}

/// The three remote calls an upsert needs.
///
/// The trait is `Send` + `Sync` and intended for async/await usage; it is
/// implemented by the real GitLab client and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait VariableStore: Send + Sync {
    /// Probe whether the destination variable already exists on the project.
    ///
    /// Only a 404 means "absent". Every other probe status, error statuses
    /// included, reports "present" and routes the task to an update.
    async fn variable_exists(&self, variable: &ProjectVariable) -> Result<bool, StoreError>;

    /// Create the variable with its key and value.
    async fn create_variable(&self, variable: &ProjectVariable) -> Result<(), StoreError>;

    /// Overwrite the existing variable's value.
    async fn update_variable(&self, variable: &ProjectVariable) -> Result<(), StoreError>;
}
