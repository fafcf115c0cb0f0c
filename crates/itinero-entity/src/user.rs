//! User entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Given name.
    pub name: String,
    /// Family name (may be empty).
    pub surname: String,
    /// Contact phone number.
    pub phone: String,
    /// Unique email address used for login.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// Display name: given name plus the surname when it is non-blank.
    pub fn display_name(&self) -> String {
        if self.surname.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.surname)
        }
    }
}

/// Minimal user projection embedded in other responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserBasic {
    /// User identifier.
    pub id: i64,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
}
