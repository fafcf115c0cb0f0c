//! Integration tests for registration and login.

use crate::helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_register_and_login() {
    let app = helpers::TestApp::new().await;
    app.register("Ada", "ada@test.com", "password123").await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "email": "ada@test.com",
                "password": "password123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.get("token").is_some());
    assert!(response.body.get("userId").is_some());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = helpers::TestApp::new().await;
    app.register("Ada", "dup@test.com", "password123").await;

    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(serde_json::json!({
                "name": "Ada",
                "surname": "Again",
                "email": "dup@test.com",
                "password": "password123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = helpers::TestApp::new().await;
    app.register("Ada", "ada2@test.com", "password123").await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "email": "ada2@test.com",
                "password": "wrongpassword",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_nonexistent_user() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "email": "nobody@test.com",
                "password": "password123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/auth/register",
            Some(serde_json::json!({
                "name": "Ada",
                "email": "short@test.com",
                "password": "abc",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
