//! Integration tests for the chat REST surface.

use crate::helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_group_listing_shows_owned_trip() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Owner", "chat1@test.com", "password123").await;
    let group_code = app.create_trip(&token, "Vienna").await;

    let response = app.request("GET", "/chat/groups", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let groups = response.body.as_array().expect("Expected group array");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["groupCode"], group_code.as_str());
    assert_eq!(groups[0]["groupName"], "Vienna");
    assert!(groups[0]["lastMessage"].is_null());
}

#[tokio::test]
async fn test_message_history_requires_membership() {
    let app = helpers::TestApp::new().await;
    let owner = app.register("Owner", "chat2@test.com", "password123").await;
    let stranger = app
        .register("Stranger", "chat3@test.com", "password123")
        .await;
    let group_code = app.create_trip(&owner, "Prague").await;

    let response = app
        .request(
            "GET",
            &format!("/chat/groups/{}/messages", group_code),
            None,
            Some(&stranger),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "GET",
            &format!("/chat/groups/{}/messages", group_code),
            None,
            Some(&owner),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_member_listing_reports_offline_members() {
    let app = helpers::TestApp::new().await;
    let owner = app.register("Owner", "chat4@test.com", "password123").await;
    let group_code = app.create_trip(&owner, "Berlin").await;

    let response = app
        .request(
            "GET",
            &format!("/chat/groups/{}/members", group_code),
            None,
            Some(&owner),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let members = response.body["members"].as_array().expect("Expected members");
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["isOnline"], false);
}

#[tokio::test]
async fn test_edit_foreign_message_is_forbidden() {
    let app = helpers::TestApp::new().await;
    let owner = app.register("Owner", "chat5@test.com", "password123").await;
    let other = app.register("Other", "chat6@test.com", "password123").await;
    let group_code = app.create_trip(&owner, "Krakow").await;

    // Seed a message directly; provisioning normally happens on first
    // WebSocket connection.
    sqlx::query("INSERT INTO chat_groups (group_code, group_name, owner_id) SELECT $1, 'Krakow', owner_id FROM trips WHERE group_code = $1")
        .bind(&group_code)
        .execute(&app.db_pool)
        .await
        .expect("Failed to provision group");
    let message_id: i64 = sqlx::query_scalar(
        "INSERT INTO chat_messages (group_code, sender_id, sender_name, message) \
         SELECT $1, owner_id, 'Owner', 'original' FROM trips WHERE group_code = $1 RETURNING id",
    )
    .bind(&group_code)
    .fetch_one(&app.db_pool)
    .await
    .expect("Failed to seed message");

    let response = app
        .request(
            "PUT",
            &format!("/chat/messages/{}", message_id),
            Some(serde_json::json!({ "newMessage": "hacked" })),
            Some(&other),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "PUT",
            &format!("/chat/messages/{}", message_id),
            Some(serde_json::json!({ "newMessage": "edited" })),
            Some(&owner),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "edited");
    assert_eq!(response.body["isEdited"], true);
}
