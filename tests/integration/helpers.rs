//! Shared test helpers for integration tests.
//!
//! These tests require a PostgreSQL instance; point `ITINERO__DATABASE__URL`
//! at a scratch database before running them.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use itinero_core::config::AppConfig;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db_pool: PgPool,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application against a clean database
    pub async fn new() -> Self {
        let config = AppConfig::load("test").expect("Failed to load test config");

        let db_pool = itinero_database::connection::create_pool(&config.database)
            .await
            .expect("Failed to connect to test database");

        itinero_database::migration::run_migrations(&db_pool)
            .await
            .expect("Failed to run migrations");

        Self::clean_database(&db_pool).await;

        let router = itinero_api::build_router(itinero_api::AppState::new(
            config.clone(),
            db_pool.clone(),
        ));

        Self {
            router,
            db_pool,
            config,
        }
    }

    /// Clean all test data from the database
    async fn clean_database(pool: &PgPool) {
        let tables = [
            "itinerary_items",
            "expense_debtors",
            "expenses",
            "chat_messages",
            "chat_groups",
            "trip_members",
            "trips",
            "users",
        ];

        for table in &tables {
            let query = format!("DELETE FROM {}", table);
            let _ = sqlx::query(&query).execute(pool).await;
        }
    }

    /// Register a user through the API and return their bearer token
    pub async fn register(&self, name: &str, email: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/auth/register",
                Some(serde_json::json!({
                    "name": name,
                    "surname": "Tester",
                    "email": email,
                    "password": password,
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );

        response
            .body
            .get("token")
            .and_then(|v| v.as_str())
            .expect("No token in register response")
            .to_string()
    }

    /// Create a trip and return its group code
    pub async fn create_trip(&self, token: &str, destination: &str) -> String {
        let response = self
            .request(
                "POST",
                "/trips",
                Some(serde_json::json!({
                    "destination": destination,
                    "startDate": "2026-09-10",
                    "endDate": "2026-09-14",
                    "summary": "test trip",
                    "accommodation": {
                        "name": "Hotel",
                        "phone": "+421",
                        "checkIn": "2026-09-10T14:00:00",
                        "checkOut": "2026-09-14T10:00:00",
                        "location": {
                            "name": "Center",
                            "latitude": 48.15,
                            "longitude": 17.11
                        }
                    },
                    "reservationCode": "RES-1",
                    "extraInfo": "",
                    "additionalInfo": ""
                })),
                Some(token),
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Trip creation failed: {:?}",
            response.body
        );

        response
            .body
            .get("groupCode")
            .and_then(|v| v.as_str())
            .expect("No groupCode in trip response")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
