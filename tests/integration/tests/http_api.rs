//! REST surface integration tests.

use finassist_gateway::GatewayConfig;
use finassist_integration_tests::{spawn_gateway, MockBackend};
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[tokio::test]
async fn test_send_returns_assistant_reply() {
    let (addr, _state) =
        spawn_gateway(Arc::new(MockBackend::default()), GatewayConfig::default()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/send", addr))
        .json(&serde_json::json!({"message": "hello"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["response"], "Hi there");
}

#[tokio::test]
async fn test_send_malformed_body_is_400() {
    let (addr, _state) =
        spawn_gateway(Arc::new(MockBackend::default()), GatewayConfig::default()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/send", addr))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_health_reports_client_count() {
    let (addr, _state) =
        spawn_gateway(Arc::new(MockBackend::default()), GatewayConfig::default()).await;

    let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["clients"], 0);
}

#[tokio::test]
async fn test_upload_persists_and_indexes() {
    let uploads = tempfile::tempdir().unwrap();
    let backend = Arc::new(MockBackend::default());
    let config = GatewayConfig {
        uploads_dir: uploads.path().to_path_buf(),
        ..GatewayConfig::default()
    };
    let (addr, _state) = spawn_gateway(backend.clone(), config).await;

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(b"Q1 revenue: 100".to_vec()).file_name("report.pdf"),
    );

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/upload", addr))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["file"], "report.pdf");

    assert!(uploads.path().join("report.pdf").exists());
    assert_eq!(backend.attach_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_upload_store_failure_leaves_assistant_untouched() {
    let uploads = tempfile::tempdir().unwrap();
    let backend = Arc::new(MockBackend {
        fail_store: true,
        ..MockBackend::default()
    });
    let config = GatewayConfig {
        uploads_dir: uploads.path().to_path_buf(),
        ..GatewayConfig::default()
    };
    let (addr, _state) = spawn_gateway(backend.clone(), config).await;

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(b"Q1 revenue: 100".to_vec()).file_name("report.pdf"),
    );

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/upload", addr))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(backend.attach_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upload_without_file_field_is_400() {
    let (addr, _state) =
        spawn_gateway(Arc::new(MockBackend::default()), GatewayConfig::default()).await;

    let form = reqwest::multipart::Form::new().text("other", "value");
    let response = reqwest::Client::new()
        .post(format!("http://{}/api/upload", addr))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}
