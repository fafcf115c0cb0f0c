//! Integration tests for itinerary items.

use crate::helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_itinerary_crud() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Owner", "itin1@test.com", "password123").await;
    let group_code = app.create_trip(&token, "Florence").await;

    let response = app
        .request(
            "POST",
            &format!("/trips/{}/itinerary", group_code),
            Some(serde_json::json!({
                "name": "Uffizi",
                "description": "Gallery visit",
                "date": "2026-09-11",
                "time": "10:00:00",
                "location": "Piazzale degli Uffizi"
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let item_id = response.body["id"].as_i64().expect("Expected item id");

    let response = app
        .request(
            "GET",
            &format!("/trips/{}/itinerary", group_code),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().map(Vec::len), Some(1));

    let response = app
        .request(
            "POST",
            &format!("/trips/{}/itinerary/{}/complete", group_code, item_id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "GET",
            &format!("/trips/{}/itinerary/{}", group_code, item_id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["isCompleted"], true);

    let response = app
        .request(
            "DELETE",
            &format!("/trips/{}/itinerary/{}", group_code, item_id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_item_addressed_through_wrong_group_is_not_found() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Owner", "itin2@test.com", "password123").await;
    let first = app.create_trip(&token, "Siena").await;
    let second = app.create_trip(&token, "Pisa").await;

    let response = app
        .request(
            "POST",
            &format!("/trips/{}/itinerary", first),
            Some(serde_json::json!({
                "name": "Duomo",
                "description": "",
                "date": "2026-09-11",
                "time": "09:00:00",
                "location": ""
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let item_id = response.body["id"].as_i64().expect("Expected item id");

    let response = app
        .request(
            "GET",
            &format!("/trips/{}/itinerary/{}", second, item_id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_today_overview_filters_by_date() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Owner", "itin3@test.com", "password123").await;
    let group_code = app.create_trip(&token, "Verona").await;

    let today = chrono::Utc::now().date_naive();
    app.request(
        "POST",
        &format!("/trips/{}/itinerary", group_code),
        Some(serde_json::json!({
            "name": "Arena",
            "description": "",
            "date": today.to_string(),
            "time": "18:00:00",
            "location": ""
        })),
        Some(&token),
    )
    .await;
    app.request(
        "POST",
        &format!("/trips/{}/itinerary", group_code),
        Some(serde_json::json!({
            "name": "Later",
            "description": "",
            "date": "2030-01-01",
            "time": "09:00:00",
            "location": ""
        })),
        Some(&token),
    )
    .await;

    let response = app
        .request(
            "GET",
            &format!("/trips/{}/today-overview", group_code),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let items = response.body["items"].as_array().expect("Expected items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Arena");
}
