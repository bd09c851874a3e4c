//! Loads the YAML projects mapping and assembles the validated run
//! configuration for the sync command.
//!
//! This module is the only place where untrusted YAML is parsed and mapped
//! to the strongly-typed internal structs. Any failure here aborts the run
//! before a single remote call is attempted, with clear diagnostics for the
//! CLI and tests.

use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::{error, info};

use var_sync_core::config::{GitlabConfig, ProjectsConfig};

/// Validated configuration for one sync run.
#[derive(Debug)]
pub struct RunConfig {
    pub projects: ProjectsConfig,
    pub gitlab: GitlabConfig,
    pub max_workers: usize,
}

/// Loads the projects mapping file and assembles the run configuration from
/// it and the remaining CLI arguments.
pub fn load_run_config<P: AsRef<Path>>(
    path: P,
    api_url: String,
    api_token: String,
    max_workers: usize,
) -> Result<RunConfig> {
    let path_ref = path.as_ref();
    info!(projects_path = ?path_ref, "Loading projects mapping from file");

    if max_workers == 0 {
        error!("--max-workers must be at least 1");
        return Err(anyhow::anyhow!("--max-workers must be at least 1"));
    }

    let contents = match fs::read_to_string(path_ref) {
        Ok(contents) => {
            info!(projects_path = ?path_ref, "Projects file read successfully");
            contents
        }
        Err(e) => {
            error!(error = ?e, projects_path = ?path_ref, "Failed to read projects file");
            return Err(anyhow::anyhow!(
                "Failed to read projects file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let projects: ProjectsConfig = match serde_yaml::from_str(&contents) {
        Ok(parsed) => {
            info!(projects_path = ?path_ref, "Parsed projects YAML successfully");
            parsed
        }
        Err(e) => {
            error!(error = ?e, projects_path = ?path_ref, "Failed to parse projects YAML");
            return Err(anyhow::anyhow!("Failed to parse projects YAML: {e}"));
        }
    };

    projects.trace_loaded();

    Ok(RunConfig {
        projects,
        gitlab: GitlabConfig {
            url: api_url,
            token: api_token,
        },
        max_workers,
    })
}
