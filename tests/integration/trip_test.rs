//! Integration tests for trip creation and membership flow.

use crate::helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_create_trip_and_list() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Owner", "owner@test.com", "password123").await;

    let group_code = app.create_trip(&token, "Lisbon").await;
    assert!(group_code.starts_with("ITN-"));

    let response = app.request("GET", "/trips", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    let trips = response.body.as_array().expect("Expected trip array");
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0]["destination"], "Lisbon");
}

#[tokio::test]
async fn test_join_flow_requires_owner_approval() {
    let app = helpers::TestApp::new().await;
    let owner = app.register("Owner", "owner2@test.com", "password123").await;
    let joiner = app.register("Joiner", "joiner@test.com", "password123").await;

    let group_code = app.create_trip(&owner, "Porto").await;

    // Joiner requests membership.
    let response = app
        .request(
            "POST",
            &format!("/trips/{}/join", group_code),
            None,
            Some(&joiner),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // Pending until the owner accepts; the joiner cannot read trip info yet.
    let response = app
        .request(
            "GET",
            &format!("/trips/{}/info", group_code),
            None,
            Some(&joiner),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "GET",
            &format!("/trips/{}/pending", group_code),
            None,
            Some(&owner),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let pending = response.body.as_array().expect("Expected pending array");
    assert_eq!(pending.len(), 1);
    let member_id = pending[0]["id"].as_i64().expect("Expected member id");

    let response = app
        .request(
            "POST",
            &format!("/trips/{}/members/{}/accept", group_code, member_id),
            None,
            Some(&owner),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // Accepted members can read trip info.
    let response = app
        .request(
            "GET",
            &format!("/trips/{}/info", group_code),
            None,
            Some(&joiner),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_owner_cannot_join_own_trip() {
    let app = helpers::TestApp::new().await;
    let owner = app.register("Owner", "owner3@test.com", "password123").await;
    let group_code = app.create_trip(&owner, "Madrid").await;

    let response = app
        .request(
            "POST",
            &format!("/trips/{}/join", group_code),
            None,
            Some(&owner),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_non_owner_cannot_delete_trip() {
    let app = helpers::TestApp::new().await;
    let owner = app.register("Owner", "owner4@test.com", "password123").await;
    let other = app.register("Other", "other@test.com", "password123").await;
    let group_code = app.create_trip(&owner, "Rome").await;

    let response = app
        .request(
            "DELETE",
            &format!("/trips/{}", group_code),
            None,
            Some(&other),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_trip_routes_require_auth() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/trips", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
