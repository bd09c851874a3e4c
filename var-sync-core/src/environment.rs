use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::ProjectsConfig;

/// Failure to resolve a source environment variable the mapping references.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("environment variable {name} is not set")]
    Missing { name: String },
    #[error("environment variable {name} is not valid unicode")]
    NotUnicode { name: String },
}

/// Resolve every source environment variable the mapping references.
///
/// Names are checked in sorted order and the first unresolvable one aborts
/// the run, so no partial set of values ever reaches the upsert pipeline and
/// a missing source can never become an empty destination variable.
pub fn resolve_source_vars(config: &ProjectsConfig) -> Result<HashMap<String, String>, EnvError> {
    let names = config.source_var_names();
    info!(count = names.len(), "Fetching source environment variables");

    let mut values = HashMap::with_capacity(names.len());
    for name in names {
        match std::env::var(&name) {
            Ok(value) => {
                debug!(name = %name, "Resolved source environment variable");
                values.insert(name, value);
            }
            Err(std::env::VarError::NotPresent) => {
                return Err(EnvError::Missing { name });
            }
            Err(std::env::VarError::NotUnicode(_)) => {
                return Err(EnvError::NotUnicode { name });
            }
        }
    }
    Ok(values)
}
