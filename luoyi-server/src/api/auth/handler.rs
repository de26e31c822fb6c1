//! Authentication Handlers
//!
//! Handles login against the configured credential pairs and token
//! introspection. Accounts are fixed at two: the admin (schema management,
//! data transfer) and an optional member (browse and record keeping).

use std::time::Duration;

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    /// admin | member
    pub role: String,
}

/// Login handler
///
/// Authenticates user credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let config = &state.config;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Check credentials - unified error message to prevent username enumeration
    let (user_id, role) = if req.username == config.admin_username
        && req.password == config.admin_password
    {
        ("admin", "admin")
    } else if config.member_username.as_deref() == Some(req.username.as_str())
        && config.member_password.as_deref() == Some(req.password.as_str())
    {
        ("member", "member")
    } else {
        security_log!("WARN", "login_failed", username = req.username.clone());
        tracing::warn!(username = %req.username, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    };

    let token = state
        .jwt_service
        .generate_token(user_id, &req.username, role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    security_log!(
        "INFO",
        "login_success",
        user_id = user_id,
        username = req.username.clone(),
        role = role
    );
    tracing::info!(
        user_id = %user_id,
        username = %req.username,
        role = %role,
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        token,
        user: UserInfo {
            id: user_id.to_string(),
            username: req.username,
            role: role.to_string(),
        },
    }))
}

/// Get current user info
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<UserInfo> {
    Json(UserInfo {
        id: user.id,
        username: user.username,
        role: user.role,
    })
}

/// Logout handler
///
/// JWT is stateless; the client discards the token. Logged for the trail.
pub async fn logout(Extension(user): Extension<CurrentUser>) -> Json<()> {
    security_log!(
        "INFO",
        "logout",
        user_id = user.id.clone(),
        username = user.username.clone()
    );
    Json(())
}
