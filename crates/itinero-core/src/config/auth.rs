//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// JWT and password hashing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign JWTs.
    pub jwt_secret: String,
    /// Token issuer claim.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// Token time-to-live in hours.
    #[serde(default = "default_ttl_hours")]
    pub jwt_ttl_hours: u64,
}

fn default_issuer() -> String {
    "itinero-server".to_string()
}

fn default_ttl_hours() -> u64 {
    10
}
