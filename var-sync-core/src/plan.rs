use std::collections::HashMap;

use thiserror::Error;

use crate::config::ProjectsConfig;

/// One destination variable to set on one project. The unit of work for the
/// upsert pipeline: every task is independent of every other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectVariable {
    /// Project path as written in the mapping, e.g. `group/api`.
    pub project: String,
    /// Percent-encoded form of the path, usable as a single URL segment.
    pub project_encoded: String,
    /// Destination CI/CD variable key.
    pub key: String,
    /// Value resolved from the source environment variable.
    pub value: String,
}

impl ProjectVariable {
    pub fn new(project: &str, key: &str, value: &str) -> Self {
        Self {
            project: project.to_string(),
            project_encoded: urlencoding::encode(project).into_owned(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("no resolved value for source environment variable {name}")]
    Unresolved { name: String },
}

/// Expand the mapping into the flat list of variable tasks, one per
/// (project, destination key) pair, with values filled in from `resolved`.
///
/// Pure expansion, no I/O. The lookup cannot fail when `resolved` comes from
/// [`crate::environment::resolve_source_vars`] over the same mapping.
pub fn expand(
    config: &ProjectsConfig,
    resolved: &HashMap<String, String>,
) -> Result<Vec<ProjectVariable>, PlanError> {
    let mut tasks = Vec::with_capacity(config.variable_count());
    for (project, variables) in &config.projects {
        for (source_name, dest_key) in variables {
            let value = resolved.get(source_name).ok_or_else(|| PlanError::Unresolved {
                name: source_name.clone(),
            })?;
            tasks.push(ProjectVariable::new(project, dest_key, value));
        }
    }
    Ok(tasks)
}
