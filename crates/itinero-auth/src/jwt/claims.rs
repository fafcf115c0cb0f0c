//! JWT claims structure embedded in every bearer token.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Claims payload of an Itinero bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user ID rendered as a string per RFC 7519.
    pub sub: String,
    /// Email address at issuance time.
    pub email: String,
    /// Token issuer.
    pub iss: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Returns the user ID from the subject claim, if it parses.
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
