//! Reqwest-backed [`VariableStore`] for the GitLab project variables API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::{debug, info};

use crate::config::GitlabConfig;
use crate::contract::{StoreError, VariableStore};
use crate::plan::ProjectVariable;

/// Client for one GitLab instance.
///
/// Cheap to construct; the pipeline builds one per task so no connection
/// state is shared between concurrent workers.
pub struct GitlabClient {
    http: Client,
    base_url: String,
    token: String,
}

impl GitlabClient {
    pub fn new(config: &GitlabConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(), // avoid "//"
            token: config.token.clone(),
        }
    }

    fn variable_url(&self, variable: &ProjectVariable) -> String {
        format!(
            "{}/api/v4/projects/{}/variables/{}",
            self.base_url, variable.project_encoded, variable.key
        )
    }

    fn variables_url(&self, variable: &ProjectVariable) -> String {
        format!(
            "{}/api/v4/projects/{}/variables",
            self.base_url, variable.project_encoded
        )
    }
}

#[async_trait]
impl VariableStore for GitlabClient {
    async fn variable_exists(&self, variable: &ProjectVariable) -> Result<bool, StoreError> {
        let url = self.variable_url(variable);
        let status = self
            .http
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .status();
        debug!(
            project = %variable.project,
            key = %variable.key,
            status = %status,
            "Probed project variable"
        );
        Ok(status != StatusCode::NOT_FOUND)
    }

    async fn create_variable(&self, variable: &ProjectVariable) -> Result<(), StoreError> {
        let url = self.variables_url(variable);
        info!(project = %variable.project, key = %variable.key, "Creating project variable");
        let response = self
            .http
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&json!({ "key": variable.key, "value": variable.value }))
            .send()
            .await?;
        check_write_response(response).await
    }

    async fn update_variable(&self, variable: &ProjectVariable) -> Result<(), StoreError> {
        let url = self.variable_url(variable);
        info!(project = %variable.project, key = %variable.key, "Updating project variable");
        let response = self
            .http
            .put(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&json!({ "value": variable.value }))
            .send()
            .await?;
        check_write_response(response).await
    }
}

/// Non-success create/update responses become [`StoreError::Api`] carrying
/// the response body text.
async fn check_write_response(response: reqwest::Response) -> Result<(), StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
    Err(StoreError::Api { status, body })
}
