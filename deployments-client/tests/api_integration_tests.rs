//! Integration tests for deployments-client API operations.
//!
//! These tests use wiremock to simulate server responses and verify
//! that the client correctly handles various API scenarios.

use deployments_client::{
    ApiClient, ArtifactUpdate, ArtifactUpload, ArtifactsClient, Attribute, ClientError,
    DeploymentLog, DeploymentQuery, DeploymentStatusFilter, DeploymentsClient, DeviceClient,
    DeviceDeploymentStatus, ExpectedStats, InventoryClient, LogLevel, LogMessage, NewDeployment,
    StatCounter, StatusReport,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const API: &str = "/api/0.0.1";

fn api(server: &MockServer) -> ApiClient {
    ApiClient::new(format!("{}{}", server.uri(), API)).unwrap()
}

fn api_path(suffix: &str) -> String {
    format!("{}{}", API, suffix)
}

// Artifacts

#[tokio::test]
async fn test_add_artifact_returns_id_from_location() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("/artifacts")))
        .respond_with(ResponseTemplate::new(201).insert_header("Location", "/artifacts/abc123"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let artifacts = ArtifactsClient::new(api(&mock_server));
    let id = artifacts
        .add_artifact(ArtifactUpload::new("test artifact", vec![1u8; 32]))
        .await
        .unwrap();

    assert_eq!(id, "abc123");
}

#[tokio::test]
async fn test_add_artifact_multipart_order() {
    let mock_server = MockServer::start().await;

    // The server rejects an artifact part that arrives before its size.
    let ordered_parts = |request: &Request| {
        let body = String::from_utf8_lossy(&request.body);
        let description = body.find("name=\"description\"");
        let size = body.find("name=\"size\"");
        let artifact = body.find("name=\"artifact\"; filename=\"firmware\"");
        matches!((description, size, artifact), (Some(d), Some(s), Some(a)) if d < s && s < a)
    };

    Mock::given(method("POST"))
        .and(path(api_path("/artifacts")))
        .and(ordered_parts)
        .respond_with(
            ResponseTemplate::new(201).insert_header("Location", "./artifacts/ordered"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let artifacts = ArtifactsClient::new(api(&mock_server));
    let id = artifacts
        .add_artifact(ArtifactUpload::new("ordered", b"payload".to_vec()))
        .await
        .unwrap();

    assert_eq!(id, "ordered");
}

#[tokio::test]
async fn test_add_artifact_missing_location() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("/artifacts")))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;

    let artifacts = ArtifactsClient::new(api(&mock_server));
    let result = artifacts
        .add_artifact(ArtifactUpload::new("no location", vec![0u8; 4]))
        .await;

    match result {
        Err(ClientError::RequestFailed {
            status, message, ..
        }) => {
            assert_eq!(status, 201);
            assert!(message.contains("Location"));
        }
        other => panic!("Expected RequestFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_add_artifact_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("/artifacts")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "artifact file too large",
            "request_id": "req-42"
        })))
        .mount(&mock_server)
        .await;

    let artifacts = ArtifactsClient::new(api(&mock_server));
    let err = artifacts
        .add_artifact(ArtifactUpload::new("too big", vec![0u8; 4]))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("artifact file too large"));
    assert_eq!(
        err.response().and_then(|r| r.request_id()).as_deref(),
        Some("req-42")
    );
}

#[tokio::test]
async fn test_delete_artifact() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(api_path("/artifacts/abc123")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let artifacts = ArtifactsClient::new(api(&mock_server));
    artifacts.delete_artifact("abc123").await.unwrap();
}

#[tokio::test]
async fn test_delete_artifact_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(api_path("/artifacts/missing")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Resource not found"
        })))
        .mount(&mock_server)
        .await;

    let artifacts = ArtifactsClient::new(api(&mock_server));
    let result = artifacts.delete_artifact("missing").await;

    match result {
        Err(ClientError::RequestFailed {
            status,
            message,
            response,
        }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Resource not found");
            assert_eq!(response.status.as_u16(), 404);
        }
        other => panic!("Expected RequestFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_and_list_artifacts() {
    let mock_server = MockServer::start().await;

    let artifact = json!({
        "id": "abc123",
        "name": "release-1",
        "description": "nightly",
        "device_types_compatible": ["beaglebone"],
        "signed": false,
        "modified": "2024-01-15T10:00:00Z",
        "size": 1024,
        "updates": []
    });

    Mock::given(method("GET"))
        .and(path(api_path("/artifacts/abc123")))
        .respond_with(ResponseTemplate::new(200).set_body_json(artifact.clone()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("/artifacts")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([artifact])))
        .mount(&mock_server)
        .await;

    let artifacts = ArtifactsClient::new(api(&mock_server));

    let single = artifacts.get_artifact("abc123").await.unwrap();
    assert_eq!(single.name, "release-1");
    assert_eq!(single.device_types_compatible, vec!["beaglebone"]);
    assert_eq!(single.size, Some(1024));

    let all = artifacts.list_artifacts().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, "abc123");
}

#[tokio::test]
async fn test_edit_artifact() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(api_path("/artifacts/abc123")))
        .and(body_json(json!({"description": "updated"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let artifacts = ArtifactsClient::new(api(&mock_server));
    let update = ArtifactUpdate {
        description: "updated".to_string(),
    };
    artifacts.edit_artifact("abc123", &update).await.unwrap();
}

#[tokio::test]
async fn test_artifact_download_link() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/artifacts/abc123/download")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uri": "https://s3.example.com/abc123?signature=x",
            "expire": "2024-01-15T11:00:00Z"
        })))
        .mount(&mock_server)
        .await;

    let artifacts = ArtifactsClient::new(api(&mock_server));
    let link = artifacts.artifact_download_link("abc123").await.unwrap();
    assert!(link.uri.starts_with("https://s3.example.com/abc123"));
    assert_eq!(link.expire, "2024-01-15T11:00:00Z");
}

#[tokio::test]
async fn test_management_token_sent_as_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/artifacts")))
        .and(header("Authorization", "Bearer management-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let artifacts = ArtifactsClient::new(api(&mock_server).with_token("management-token"));
    let all = artifacts.list_artifacts().await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_no_authorization_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/artifacts")))
        .and(|request: &Request| !request.headers.contains_key("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let artifacts = ArtifactsClient::new(api(&mock_server));
    artifacts.list_artifacts().await.unwrap();
}

#[tokio::test]
async fn test_success_with_unexpected_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/artifacts/abc123")))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let artifacts = ArtifactsClient::new(api(&mock_server));
    let err = artifacts.get_artifact("abc123").await.unwrap_err();

    assert!(err.is_request_failed());
    assert_eq!(err.status(), Some(200));
    assert_eq!(err.response().map(|r| r.body.as_str()), Some("not json"));
}

// Deployments

#[tokio::test]
async fn test_add_deployment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(api_path("/deployments")))
        .and(body_json(json!({
            "name": "nightly",
            "artifact_name": "release-1",
            "devices": ["device-1", "device-2"]
        })))
        .respond_with(
            ResponseTemplate::new(201).insert_header("Location", "./deployments/f00d"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let deployments = DeploymentsClient::new(api(&mock_server));
    let new = NewDeployment::new("nightly", "release-1", ["device-1", "device-2"]);
    let id = deployments.add_deployment(&new).await.unwrap();

    assert_eq!(id, "f00d");
}

#[tokio::test]
async fn test_abort_deployment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(api_path("/deployments/f00d/status")))
        .and(body_json(json!({"status": "aborted"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let deployments = DeploymentsClient::new(api(&mock_server));
    deployments.abort_deployment("f00d").await.unwrap();
}

#[tokio::test]
async fn test_abort_finished_deployment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(api_path("/deployments/f00d/status")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": "cannot abort finished deployment",
            "request_id": "req-7"
        })))
        .mount(&mock_server)
        .await;

    let deployments = DeploymentsClient::new(api(&mock_server));
    let err = deployments.abort_deployment("f00d").await.unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert!(err.to_string().contains("cannot abort finished deployment"));
}

#[tokio::test]
async fn test_get_deployment_stats() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/deployments/f00d/statistics")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": 1,
            "pending": 2,
            "failure": 0,
            "downloading": 0,
            "installing": 0,
            "rebooting": 0,
            "noartifact": 0,
            "already-installed": 0,
            "aborted": 0,
            "decommissioned": 0
        })))
        .mount(&mock_server)
        .await;

    let deployments = DeploymentsClient::new(api(&mock_server));
    let stats = deployments.get_deployment_stats("f00d").await.unwrap();

    assert_eq!(stats.get(StatCounter::Success), 1);
    assert_eq!(stats.get(StatCounter::Pending), 2);
    assert_eq!(stats.total(), 3);
}

#[tokio::test]
async fn test_verify_deployment_stats() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/deployments/f00d/statistics")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": 2,
            "pending": 1,
            "failure": null
        })))
        .mount(&mock_server)
        .await;

    let deployments = DeploymentsClient::new(api(&mock_server));

    let expected = ExpectedStats::new()
        .with(StatCounter::Success, 2)
        .with(StatCounter::Pending, 1);
    let stats = deployments
        .verify_deployment_stats("f00d", &expected)
        .await
        .unwrap();
    assert_eq!(stats.total(), 3);

    let wrong = ExpectedStats::new()
        .with(StatCounter::Success, 3)
        .with(StatCounter::Failure, 1);
    match deployments.verify_deployment_stats("f00d", &wrong).await {
        Err(ClientError::StatsMismatch(mismatch)) => {
            let counters: Vec<StatCounter> =
                mismatch.mismatches.iter().map(|m| m.counter).collect();
            assert_eq!(
                counters,
                vec![StatCounter::Success, StatCounter::Pending, StatCounter::Failure]
            );
        }
        other => panic!("Expected StatsMismatch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_deployment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/deployments/f00d")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "f00d",
            "name": "nightly",
            "artifact_name": "release-1",
            "created": "2024-01-15T10:00:00Z",
            "finished": "2024-01-15T10:30:00Z",
            "status": "finished",
            "device_count": 2
        })))
        .mount(&mock_server)
        .await;

    let deployments = DeploymentsClient::new(api(&mock_server));
    let deployment = deployments.get_deployment("f00d").await.unwrap();

    assert_eq!(deployment.name, "nightly");
    assert_eq!(deployment.finished.as_deref(), Some("2024-01-15T10:30:00Z"));
}

#[tokio::test]
async fn test_list_deployments_with_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/deployments")))
        .and(query_param("search", "release 1"))
        .and(query_param("status", "inprogress"))
        .and(query_param("per_page", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "d1",
                "name": "first",
                "artifact_name": "release 1",
                "created": "2024-01-15T10:00:00Z",
                "status": "inprogress"
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let deployments = DeploymentsClient::new(api(&mock_server));
    let query = DeploymentQuery {
        search: Some("release 1".to_string()),
        status: Some(DeploymentStatusFilter::InProgress),
        per_page: Some(5),
        ..Default::default()
    };
    let found = deployments.list_deployments(&query).await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "d1");
}

#[tokio::test]
async fn test_deployment_devices_and_log() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/deployments/f00d/devices")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "device-1",
                "status": "failure",
                "created": "2024-01-15T10:00:00Z",
                "log": true
            },
            {
                "id": "device-2",
                "status": "already-installed"
            }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("/deployments/f00d/devices/device-1/log")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("2024-01-15T10:05:00.000Z error: install failed\n"),
        )
        .mount(&mock_server)
        .await;

    let deployments = DeploymentsClient::new(api(&mock_server));

    let devices = deployments.deployment_devices("f00d").await.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].status, DeviceDeploymentStatus::Failure);
    assert!(devices[0].log);
    assert_eq!(devices[1].status, DeviceDeploymentStatus::AlreadyInstalled);
    assert!(!devices[1].log);

    let log = deployments
        .device_deployment_log("f00d", "device-1")
        .await
        .unwrap();
    assert!(log.contains("install failed"));
}

#[tokio::test]
async fn test_list_releases_by_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/deployments/releases")))
        .and(query_param("name", "release 1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "Name": "release 1",
                "Artifacts": [
                    {
                        "id": "a1",
                        "name": "release 1",
                        "description": "beaglebone build",
                        "device_types_compatible": ["beaglebone"]
                    }
                ]
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let deployments = DeploymentsClient::new(api(&mock_server));
    let releases = deployments.list_releases(Some("release 1")).await.unwrap();

    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].name, "release 1");
    assert_eq!(releases[0].artifacts[0].id, "a1");
    assert_eq!(
        releases[0].artifacts[0].device_types_compatible,
        vec!["beaglebone".to_string()]
    );
}

#[tokio::test]
async fn test_list_all_releases() {
    let mock_server = MockServer::start().await;

    let no_filter = |request: &Request| -> bool { request.url.query().is_none() };

    Mock::given(method("GET"))
        .and(path(api_path("/deployments/releases")))
        .and(no_filter)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"Name": "release 1", "Artifacts": []},
            {"Name": "release 2"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let deployments = DeploymentsClient::new(api(&mock_server));
    let releases = deployments.list_releases(None).await.unwrap();

    assert_eq!(releases.len(), 2);
    assert!(releases[1].artifacts.is_empty());
}

#[tokio::test]
async fn test_get_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/limits/storage")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"limit": 1024, "usage": 256})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let deployments = DeploymentsClient::new(api(&mock_server));
    let limit = deployments.get_limit("storage").await.unwrap();

    assert_eq!(limit.limit, 1024);
    assert_eq!(limit.usage, 256);
}

#[tokio::test]
async fn test_get_unsupported_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/limits/bandwidth")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "unsupported limit bandwidth"
        })))
        .mount(&mock_server)
        .await;

    let deployments = DeploymentsClient::new(api(&mock_server));
    let err = deployments.get_limit("bandwidth").await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("unsupported limit"));
}

// Device

#[tokio::test]
async fn test_next_deployment_available() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/device/deployments/next")))
        .and(query_param("artifact_name", "release 1"))
        .and(query_param("device_type", "beaglebone"))
        .and(header("Authorization", "Bearer device-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "f00d",
            "artifact": {
                "artifact_name": "release-2",
                "source": {
                    "uri": "https://s3.example.com/release-2",
                    "expire": "2024-01-15T11:00:00Z"
                },
                "device_types_compatible": ["beaglebone"]
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let device = DeviceClient::new(api(&mock_server));
    let next = device
        .get_next_deployment("device-token", "release 1", "beaglebone")
        .await
        .unwrap()
        .expect("deployment should be pending");

    assert_eq!(next.id, "f00d");
    assert_eq!(next.artifact.artifact_name, "release-2");
    assert_eq!(next.artifact.source.uri, "https://s3.example.com/release-2");
}

#[tokio::test]
async fn test_next_deployment_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/device/deployments/next")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let device = DeviceClient::new(api(&mock_server));
    let next = device
        .get_next_deployment("device-token", "release-1", "beaglebone")
        .await
        .unwrap();

    assert!(next.is_none());
}

#[tokio::test]
async fn test_next_deployment_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/device/deployments/next")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "unauthorized"
        })))
        .mount(&mock_server)
        .await;

    let device = DeviceClient::new(api(&mock_server));
    let err = device
        .get_next_deployment("bad-token", "release-1", "beaglebone")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_device_token_overrides_management_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(api_path("/device/deployments/f00d/status")))
        .and(header("Authorization", "Bearer device-token"))
        .and(body_json(json!({"status": "installing"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let device = DeviceClient::new(api(&mock_server).with_token("management-token"));
    device
        .report_status("device-token", "f00d", DeviceDeploymentStatus::Installing)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_report_status_with_substate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(api_path("/device/deployments/f00d/status")))
        .and(body_json(json!({"status": "downloading", "substate": "50%"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let device = DeviceClient::new(api(&mock_server));
    let report = StatusReport {
        status: DeviceDeploymentStatus::Downloading,
        substate: Some("50%".to_string()),
    };
    device
        .report_status("device-token", "f00d", report)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_report_status_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(api_path("/device/deployments/f00d/status")))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": "deployment aborted"
        })))
        .mount(&mock_server)
        .await;

    let device = DeviceClient::new(api(&mock_server));
    let err = device
        .report_status("device-token", "f00d", DeviceDeploymentStatus::Success)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(409));
}

#[tokio::test]
async fn test_upload_logs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(api_path("/device/deployments/f00d/log")))
        .and(body_json(json!({
            "messages": [
                {
                    "timestamp": "2024-01-15T10:30:00.000Z",
                    "level": "error",
                    "message": "install failed"
                }
            ]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let device = DeviceClient::new(api(&mock_server));
    let log = DeploymentLog {
        messages: vec![LogMessage {
            timestamp: "2024-01-15T10:30:00.000Z".to_string(),
            level: LogLevel::Error,
            message: "install failed".to_string(),
        }],
    };
    device
        .upload_logs("device-token", "f00d", &log)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_upload_log_lines() {
    let mock_server = MockServer::start().await;

    let two_info_lines = |request: &Request| {
        let Ok(body) = serde_json::from_slice::<serde_json::Value>(&request.body) else {
            return false;
        };
        let Some(messages) = body["messages"].as_array() else {
            return false;
        };
        messages.len() == 2
            && messages.iter().all(|m| m["level"] == "info")
            && messages[0]["message"] == "first"
            && messages[1]["message"] == "second"
    };

    Mock::given(method("PUT"))
        .and(path(api_path("/device/deployments/f00d/log")))
        .and(two_info_lines)
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let device = DeviceClient::new(api(&mock_server));
    device
        .upload_log_lines("device-token", "f00d", ["first", "second"])
        .await
        .unwrap();
}

// Inventory

#[tokio::test]
async fn test_report_attributes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/0.1.0/attributes"))
        .and(header("Authorization", "Bearer device-token"))
        .and(body_json(json!([
            {"name": "device_type", "value": "beaglebone"},
            {"name": "artifact_name", "value": "release-1"}
        ])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let inventory_api = ApiClient::new(format!("{}/api/0.1.0", mock_server.uri())).unwrap();
    let inventory = InventoryClient::new(inventory_api);
    let attributes = vec![
        Attribute::new("device_type", "beaglebone"),
        Attribute::new("artifact_name", "release-1"),
    ];
    inventory
        .report_attributes("device-token", &attributes)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_report_attributes_wrong_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/0.1.0/attributes"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let inventory_api = ApiClient::new(format!("{}/api/0.1.0", mock_server.uri())).unwrap();
    let inventory = InventoryClient::new(inventory_api);
    let err = inventory
        .report_attributes("device-token", &json!([]))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(204));
}

// Transport

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Reserve a port, then free it so nothing is listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let api = ApiClient::new(format!("http://127.0.0.1:{}{}", port, API)).unwrap();
    let artifacts = ArtifactsClient::new(api);
    let err = artifacts.delete_artifact("abc123").await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(api_path("/artifacts")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let api = api(&mock_server)
        .with_timeout(Duration::from_millis(100))
        .unwrap();
    let artifacts = ArtifactsClient::new(api);

    match artifacts.list_artifacts().await {
        Err(ClientError::Transport(err)) => assert!(err.is_timeout()),
        other => panic!("Expected Transport error, got {:?}", other),
    }
}
