//! JWT creation with configurable signing, issuer, and TTL.

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};

use itinero_core::config::AuthConfig;
use itinero_core::error::AppError;
use itinero_core::result::AppResult;

use super::claims::Claims;

/// Creates signed bearer tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Issuer embedded in every token.
    issuer: String,
    /// Token TTL in hours.
    ttl_hours: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            ttl_hours: config.jwt_ttl_hours as i64,
        }
    }

    /// Generates a bearer token for the given user.
    pub fn generate_token(&self, user_id: i64, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + chrono::Duration::hours(self.ttl_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }
}
