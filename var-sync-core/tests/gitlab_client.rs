use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use var_sync_core::config::GitlabConfig;
use var_sync_core::contract::StoreError;
use var_sync_core::gitlab::GitlabClient;
use var_sync_core::plan::ProjectVariable;
use var_sync_core::synchronise::{sync_variable, upsert};

fn gitlab_for(server: &MockServer) -> GitlabConfig {
    GitlabConfig {
        url: server.uri(),
        token: "test-token".to_string(),
    }
}

fn staging_password() -> ProjectVariable {
    ProjectVariable::new("group/api", "STAGING_DB_PASSWORD", "hunter2")
}

/// A 404 probe routes the task to a create with both key and value in the
/// request body.
#[tokio::test]
async fn upsert_creates_when_probe_reports_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fapi/variables/STAGING_DB_PASSWORD"))
        .and(header("PRIVATE-TOKEN", "test-token"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/group%2Fapi/variables"))
        .and(header("PRIVATE-TOKEN", "test-token"))
        .and(body_json(json!({ "key": "STAGING_DB_PASSWORD", "value": "hunter2" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitlabClient::new(&gitlab_for(&server));
    upsert(&client, &staging_password())
        .await
        .expect("create route should succeed");
}

/// Any probe status other than 404 routes the task to an update; the body
/// carries only the new value.
#[tokio::test]
async fn upsert_updates_when_probe_finds_variable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fapi/variables/STAGING_DB_PASSWORD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/group%2Fapi/variables/STAGING_DB_PASSWORD"))
        .and(header("PRIVATE-TOKEN", "test-token"))
        .and(body_json(json!({ "value": "hunter2" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitlabClient::new(&gitlab_for(&server));
    upsert(&client, &staging_password())
        .await
        .expect("update route should succeed");
}

/// Only 404 means "absent": a probe answering 500 reports the variable as
/// present and the task proceeds as an update.
#[tokio::test]
async fn probe_server_error_falls_through_to_update() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fapi/variables/STAGING_DB_PASSWORD"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/group%2Fapi/variables/STAGING_DB_PASSWORD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitlabClient::new(&gitlab_for(&server));
    upsert(&client, &staging_password())
        .await
        .expect("probe error should fall through to the update route");
}

/// A rejected create surfaces the API response body verbatim.
#[tokio::test]
async fn create_rejection_surfaces_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fapi/variables/STAGING_DB_PASSWORD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/group%2Fapi/variables"))
        .respond_with(
            ResponseTemplate::new(403).set_body_string("403 Forbidden - insufficient scopes"),
        )
        .mount(&server)
        .await;

    let client = GitlabClient::new(&gitlab_for(&server));
    let err = upsert(&client, &staging_password())
        .await
        .expect_err("403 on create must fail the task");

    assert!(
        matches!(&err, StoreError::Api { status, .. } if *status == reqwest::StatusCode::FORBIDDEN)
    );
    assert_eq!(err.failure_message(), "403 Forbidden - insufficient scopes");
}

#[tokio::test]
async fn update_rejection_surfaces_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fapi/variables/STAGING_DB_PASSWORD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/group%2Fapi/variables/STAGING_DB_PASSWORD"))
        .respond_with(ResponseTemplate::new(400).set_body_string("value is invalid"))
        .mount(&server)
        .await;

    let client = GitlabClient::new(&gitlab_for(&server));
    let err = upsert(&client, &staging_password())
        .await
        .expect_err("400 on update must fail the task");
    assert_eq!(err.failure_message(), "value is invalid");
}

/// Transport-level failures (nothing listening) become request errors, not
/// panics.
#[tokio::test]
async fn transport_failure_is_a_request_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe port");
        listener.local_addr().expect("local addr").port()
    };
    // Listener dropped: connections to the port are now refused.
    let gitlab = GitlabConfig {
        url: format!("http://127.0.0.1:{port}"),
        token: "test-token".to_string(),
    };

    let client = GitlabClient::new(&gitlab);
    let err = upsert(&client, &staging_password())
        .await
        .expect_err("connection refused must fail the task");
    assert!(matches!(err, StoreError::Request(_)));
    assert!(
        err.failure_message().contains("request failed"),
        "transport failures should be labelled, got: {}",
        err.failure_message()
    );
}

/// A trailing slash on the configured base URL must not produce `//` in
/// request paths.
#[tokio::test]
async fn base_url_trailing_slash_is_tolerated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fapi/variables/STAGING_DB_PASSWORD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/group%2Fapi/variables/STAGING_DB_PASSWORD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let gitlab = GitlabConfig {
        url: format!("{}/", server.uri()),
        token: "test-token".to_string(),
    };
    let client = GitlabClient::new(&gitlab);
    upsert(&client, &staging_password())
        .await
        .expect("trailing slash should be trimmed");
}

/// sync_variable never fails: a rejection becomes a result carrying the
/// response body as its message.
#[tokio::test]
async fn sync_variable_converts_rejection_into_failed_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fapi/variables/STAGING_DB_PASSWORD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/group%2Fapi/variables"))
        .respond_with(
            ResponseTemplate::new(403).set_body_string("403 Forbidden - insufficient scopes"),
        )
        .mount(&server)
        .await;

    let result = sync_variable(&gitlab_for(&server), staging_password()).await;
    assert!(!result.success);
    assert_eq!(result.message, "403 Forbidden - insufficient scopes");
    assert_eq!(result.variable.project, "group/api");
}

#[tokio::test]
async fn sync_variable_reports_success_with_empty_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fapi/variables/STAGING_DB_PASSWORD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v4/projects/group%2Fapi/variables/STAGING_DB_PASSWORD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let result = sync_variable(&gitlab_for(&server), staging_password()).await;
    assert!(result.success);
    assert!(result.message.is_empty(), "success carries no message");
}
