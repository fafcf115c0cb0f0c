//! Account endpoints: register, login, delete-account.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use validator::Validate;

use itinero_core::error::AppError;
use itinero_entity::user::User;

use crate::dto::request::{DeleteAccountRequest, LoginRequest, RegisterRequest};
use crate::dto::response::{AuthResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    if state.user_repo.find_by_email(&request.email).await?.is_some() {
        return Err(AppError::conflict("Email already in use").into());
    }

    let password_hash = state.password_hasher.hash_password(&request.password)?;
    let user = state
        .user_repo
        .create(
            &request.name,
            &request.surname,
            &request.phone,
            &request.email,
            &password_hash,
        )
        .await?;

    info!(user_id = user.id, "Account registered");
    Ok((StatusCode::CREATED, token_response(&state, &user)?))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .user_repo
        .find_by_email(&request.email)
        .await?
        .ok_or_else(|| AppError::authentication("Invalid credentials"))?;

    let valid = state
        .password_hasher
        .verify_password(&request.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::authentication("Invalid credentials").into());
    }

    token_response(&state, &user)
}

/// POST /auth/delete-account
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<DeleteAccountRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let valid = state
        .password_hasher
        .verify_password(&request.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::authentication("Invalid password").into());
    }

    state.user_repo.delete(user.id).await?;
    info!(user_id = user.id, "Account deleted");
    Ok(Json(MessageResponse::new("Account deleted successfully")))
}

fn token_response(state: &AppState, user: &User) -> ApiResult<Json<AuthResponse>> {
    let token = state.jwt_encoder.generate_token(user.id, &user.email)?;
    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
        name: user.name.clone(),
        surname: user.surname.clone(),
    }))
}
