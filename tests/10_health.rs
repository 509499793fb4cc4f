mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn health_reports_ok_on_memory_stores() {
    let app = TestApp::new();
    let res = app.get("/health", None).await;

    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "ok");
}

#[tokio::test]
async fn api_root_lists_endpoints() {
    let app = TestApp::new();
    let res = app.get("/api", None).await;

    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["data"]["name"], "Portfolio API");
    assert!(body["data"]["endpoints"]["storage"].as_str().unwrap().contains("/api/storage/upload"));
}

#[tokio::test]
async fn unknown_routes_are_404() {
    let app = TestApp::new();
    assert_eq!(app.get("/nope", None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn spawned_binary_serves_health() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::Client::new()
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}
