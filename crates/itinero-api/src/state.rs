//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use itinero_auth::jwt::{JwtDecoder, JwtEncoder};
use itinero_auth::password::PasswordHasher;
use itinero_core::config::AppConfig;
use itinero_database::repositories::chat::ChatRepository;
use itinero_database::repositories::expense::ExpenseRepository;
use itinero_database::repositories::itinerary::ItineraryRepository;
use itinero_database::repositories::trip::TripRepository;
use itinero_database::repositories::user::UserRepository;
use itinero_realtime::registry::ChatRegistry;
use itinero_realtime::store::MessageStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,

    /// JWT token encoder.
    pub jwt_encoder: Arc<JwtEncoder>,
    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Password hasher (Argon2id).
    pub password_hasher: Arc<PasswordHasher>,

    /// Live chat connection registry.
    pub chat_registry: Arc<ChatRegistry>,
    /// Durable chat message log.
    pub message_store: Arc<dyn MessageStore>,

    /// User repository.
    pub user_repo: Arc<UserRepository>,
    /// Trip and membership repository.
    pub trip_repo: Arc<TripRepository>,
    /// Chat group and message repository.
    pub chat_repo: Arc<ChatRepository>,
    /// Expense repository.
    pub expense_repo: Arc<ExpenseRepository>,
    /// Itinerary repository.
    pub itinerary_repo: Arc<ItineraryRepository>,
}

impl AppState {
    /// Wires the full state from configuration and a connected pool.
    pub fn new(config: AppConfig, db_pool: PgPool) -> Self {
        let chat_repo = Arc::new(ChatRepository::new(db_pool.clone()));
        Self {
            jwt_encoder: Arc::new(JwtEncoder::new(&config.auth)),
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            password_hasher: Arc::new(PasswordHasher::new()),
            chat_registry: Arc::new(ChatRegistry::new(&config.chat)),
            message_store: chat_repo.clone(),
            user_repo: Arc::new(UserRepository::new(db_pool.clone())),
            trip_repo: Arc::new(TripRepository::new(db_pool.clone())),
            chat_repo,
            expense_repo: Arc::new(ExpenseRepository::new(db_pool.clone())),
            itinerary_repo: Arc::new(ItineraryRepository::new(db_pool.clone())),
            config: Arc::new(config),
            db_pool,
        }
    }
}
