// src/models/user.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// User record, stored as a JSON blob under `user:{username}`.
///
/// The password hash must round-trip through the blob store, so it is
/// serialized; API responses use [`UserResponse`] instead of this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique username (also the storage key suffix).
    pub username: String,

    /// Argon2 password hash.
    pub password: String,

    /// User role: 'user' or 'admin'.
    pub role: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Public view of a user, safe to return from handlers.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}
