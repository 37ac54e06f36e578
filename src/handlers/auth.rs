// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{CreateUserRequest, LoginRequest, User, UserResponse},
    store,
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

fn user_key(username: &str) -> String {
    format!("user:{}", username)
}

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing the user blob.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = User {
        username: payload.username.clone(),
        password: hash_password(&payload.password)?,
        role: "user".to_string(),
        created_at: chrono::Utc::now(),
    };

    let blob = serde_json::to_vec(&user)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let created = store::insert(&pool, &user_key(&user.username), &blob).await?;
    if !created {
        return Err(AppError::Conflict(format!(
            "Username '{}' already exists",
            payload.username
        )));
    }

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Authenticates a user and returns a JWT token.
///
/// Verifies the username and password against the stored user blob.
/// If valid, signs a JWT token with the user's name and role.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let blob = store::get(&pool, &user_key(&payload.username))
        .await?
        .ok_or(AppError::AuthError("User not found".to_string()))?;

    let user: User = serde_json::from_slice(&blob).map_err(|e| {
        tracing::error!("Corrupt user blob for '{}': {:?}", payload.username, e);
        AppError::InternalServerError(e.to_string())
    })?;

    let is_valid = verify_password(&payload.password, &user.password)?;

    if !is_valid {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    let token = sign_jwt(
        &user.username,
        &user.role,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "role": user.role
    })))
}
