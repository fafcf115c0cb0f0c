//! Integration tests for the chat WebSocket endpoint and health endpoints.

use crate::helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_ws_upgrade_without_token() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Owner", "ws1@test.com", "password123").await;
    let group_code = app.create_trip(&token, "Athens").await;

    let response = app
        .request("GET", &format!("/chat/{}", group_code), None, None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ws_upgrade_with_invalid_token() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Owner", "ws2@test.com", "password123").await;
    let group_code = app.create_trip(&token, "Corfu").await;

    let response = app
        .request(
            "GET",
            &format!("/chat/{}?token=not-a-jwt", group_code),
            None,
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_check() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_readiness_endpoint() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/health/ready", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
}
