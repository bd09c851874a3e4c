//! Per-task outcome reporting and exit status derivation.

use tracing::{error, info};

use crate::contract::VariableResult;

/// Exit status used whenever at least one variable task failed.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Log one line per result and derive the process exit status: `0` when
/// every task succeeded, [`FAILURE_EXIT_CODE`] otherwise.
pub fn report(results: &[VariableResult]) -> i32 {
    let mut failures = 0usize;
    for result in results {
        if result.success {
            info!(
                project = %result.variable.project,
                key = %result.variable.key,
                "Updated project variable"
            );
        } else {
            failures += 1;
            error!(
                project = %result.variable.project,
                key = %result.variable.key,
                message = %result.message,
                "Failed updating project variable"
            );
        }
    }
    if failures > 0 {
        FAILURE_EXIT_CODE
    } else {
        0
    }
}
