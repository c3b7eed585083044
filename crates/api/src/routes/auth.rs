//! Auth endpoints: register, login, logout, current user.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
};
use serde::{Deserialize, Serialize};

use bramble_core::Envelope;

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::User;
use crate::services::auth;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Create an account and issue a bearer token.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Envelope<AuthResponse>>> {
    let (user, token) = auth::register(state.pool(), &req.name, &req.email, &req.password).await?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok(Json(Envelope::ok(AuthResponse { user, token })))
}

/// Verify credentials and issue a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Envelope<AuthResponse>>> {
    let (user, token) = auth::login(state.pool(), &req.email, &req.password).await?;
    Ok(Json(Envelope::ok(AuthResponse { user, token })))
}

/// Invalidate the presented bearer token.
///
/// Requires authentication so an unauthenticated call cannot distinguish
/// valid tokens from invalid ones.
pub async fn logout(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    headers: HeaderMap,
) -> Result<Json<Envelope<()>>> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        auth::logout(state.pool(), token.trim()).await?;
    }
    Ok(Json(Envelope::message("Logged out")))
}

/// The authenticated user's profile.
pub async fn me(RequireUser(user): RequireUser) -> Json<Envelope<User>> {
    Json(Envelope::ok(user))
}
