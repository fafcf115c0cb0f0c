//! Integration tests for expense tracking and balances.

use crate::helpers;

use axum::http::StatusCode;

async fn trip_id_for(app: &helpers::TestApp, group_code: &str) -> i64 {
    sqlx::query_scalar("SELECT id FROM trips WHERE group_code = $1")
        .bind(group_code)
        .fetch_one(&app.db_pool)
        .await
        .expect("Trip not found")
}

#[tokio::test]
async fn test_create_expense_with_equal_split() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Payer", "exp1@test.com", "password123").await;
    let group_code = app.create_trip(&token, "Budapest").await;
    let trip_id = trip_id_for(&app, &group_code).await;

    let user_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind("exp1@test.com")
        .fetch_one(&app.db_pool)
        .await
        .expect("User not found");

    let response = app
        .request(
            "POST",
            "/expenses",
            Some(serde_json::json!({
                "tripId": trip_id,
                "name": "Dinner",
                "amount": 60.0,
                "date": "2026-09-11",
                "category": "food",
                "paidByUserId": user_id,
                "paymentMethod": "card",
                "splitType": "EQUAL",
                "debtors": [{ "userId": user_id, "splitValue": 0.0 }]
            })),
            Some(&token),
        )
        .await;
    assert_eq!(
        response.status,
        StatusCode::CREATED,
        "Expense creation failed: {:?}",
        response.body
    );
    assert_eq!(response.body["name"], "Dinner");

    let response = app
        .request(
            "GET",
            &format!("/trips/{}/expenses", group_code),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let expenses = response.body.as_array().expect("Expected expense array");
    assert_eq!(expenses.len(), 1);
    // The single debtor is the payer and owes the whole amount to themselves.
    assert_eq!(expenses[0]["debtors"][0]["amount"], 60.0);
    assert_eq!(expenses[0]["debtors"][0]["hasPaid"], true);
}

#[tokio::test]
async fn test_expense_summary_balances() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Payer", "exp2@test.com", "password123").await;
    let group_code = app.create_trip(&token, "Ljubljana").await;
    let trip_id = trip_id_for(&app, &group_code).await;

    let user_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind("exp2@test.com")
        .fetch_one(&app.db_pool)
        .await
        .expect("User not found");

    app.request(
        "POST",
        "/expenses",
        Some(serde_json::json!({
            "tripId": trip_id,
            "name": "Museum",
            "amount": 40.0,
            "date": "2026-09-12",
            "category": "culture",
            "paidByUserId": user_id,
            "paymentMethod": "cash",
            "splitType": "EQUAL",
            "debtors": [{ "userId": user_id, "splitValue": 0.0 }]
        })),
        Some(&token),
    )
    .await;

    let response = app
        .request(
            "GET",
            &format!("/trips/{}/expenses/summary", group_code),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["totalSpent"], 40.0);
    assert_eq!(response.body["expenseCount"], 1);
    // Paid 40, owes their own 40-share: net zero.
    assert_eq!(response.body["balances"][0]["balance"], 0.0);
}

#[tokio::test]
async fn test_expense_requires_membership() {
    let app = helpers::TestApp::new().await;
    let owner = app.register("Owner", "exp3@test.com", "password123").await;
    let stranger = app
        .register("Stranger", "exp4@test.com", "password123")
        .await;
    let group_code = app.create_trip(&owner, "Zagreb").await;

    let response = app
        .request(
            "GET",
            &format!("/trips/{}/expenses", group_code),
            None,
            Some(&stranger),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expense_rejects_empty_debtors() {
    let app = helpers::TestApp::new().await;
    let token = app.register("Payer", "exp5@test.com", "password123").await;
    let group_code = app.create_trip(&token, "Split").await;
    let trip_id = trip_id_for(&app, &group_code).await;

    let response = app
        .request(
            "POST",
            "/expenses",
            Some(serde_json::json!({
                "tripId": trip_id,
                "name": "Nothing",
                "amount": 10.0,
                "date": "2026-09-12",
                "category": "misc",
                "paidByUserId": 1,
                "paymentMethod": "cash",
                "splitType": "EQUAL",
                "debtors": []
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
