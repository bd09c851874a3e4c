use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Declarative mapping of GitLab projects to the CI/CD variables they receive.
///
/// Each project path maps source environment variable names to the
/// destination variable keys they are written under:
///
/// ```yaml
/// projects:
///   group/api:
///     DB_PASSWORD: STAGING_DB_PASSWORD
///   group/worker:
///     DB_PASSWORD: STAGING_DB_PASSWORD
///     SENTRY_DSN: SENTRY_DSN
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsConfig {
    pub projects: HashMap<String, HashMap<String, String>>,
}

impl ProjectsConfig {
    /// Distinct source environment variable names referenced anywhere in the
    /// mapping, in sorted order.
    pub fn source_var_names(&self) -> BTreeSet<String> {
        self.projects
            .values()
            .flat_map(|variables| variables.keys().cloned())
            .collect()
    }

    /// Total number of (project, destination key) pairs the mapping declares.
    pub fn variable_count(&self) -> usize {
        self.projects.values().map(|variables| variables.len()).sum()
    }

    pub fn trace_loaded(&self) {
        info!(
            projects_count = self.projects.len(),
            variables_count = self.variable_count(),
            "Loaded ProjectsConfig"
        );
        debug!(?self, "ProjectsConfig loaded (full debug)");
    }
}

/// Connection details for one GitLab instance, shared read-only by every
/// concurrent variable operation.
#[derive(Debug, Clone)]
pub struct GitlabConfig {
    /// Base URL of the instance hosting the v4 REST API, without the
    /// `/api/v4` suffix.
    pub url: String,
    /// Token sent as the `PRIVATE-TOKEN` header on every request.
    pub token: String,
}
