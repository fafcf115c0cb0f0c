//! `AuthUser` extractor — pulls the bearer JWT from the Authorization
//! header, validates it, and resolves the calling user.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use itinero_core::error::AppError;
use itinero_entity::user::User;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated user behind the current request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl std::ops::Deref for AuthUser {
    type Target = User;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let claims = state.jwt_decoder.decode_token(token)?;

        // Tokens identify the user by email; the account may have been
        // deleted since issuance.
        let user = state
            .user_repo
            .find_by_email(&claims.email)
            .await?
            .ok_or_else(|| AppError::authentication("User not found"))?;

        Ok(AuthUser(user))
    }
}
