//! Authentication extractors for route handlers.
//!
//! Clients send `Authorization: Bearer <token>`; the token is looked up in
//! `auth_tokens` on every request, so revocation takes effect immediately.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::db::{RepositoryError, UserRepository};
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires an authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_orders(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("orders for {}", user.email)
/// }
/// ```
pub struct RequireUser(pub User);

/// Extractor that requires an authenticated admin user.
///
/// Rejects with 401 when unauthenticated and 403 when the user is not
/// an admin.
pub struct RequireAdmin(pub User);

/// The bearer token from the `Authorization` header, if present.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn current_user(parts: &Parts, state: &AppState) -> Result<User, AppError> {
    let token =
        bearer_token(parts).ok_or_else(|| AppError::Unauthorized("Missing token".to_owned()))?;

    match UserRepository::new(state.pool()).get_by_token(token).await {
        Ok(user) => Ok(user),
        Err(RepositoryError::NotFound) => {
            Err(AppError::Unauthorized("Invalid or expired token".to_owned()))
        }
        Err(err) => Err(err.into()),
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        current_user(parts, state).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = current_user(parts, state).await?;
        if !user.is_admin {
            return Err(AppError::Forbidden("Admin access required".to_owned()));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: &str) -> Parts {
        let (parts, ()) = Request::builder()
            .uri("/api/orders")
            .header(header::AUTHORIZATION, value)
            .body(())
            .expect("valid request")
            .into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth("Bearer abc123");
        assert_eq!(bearer_token(&parts), Some("abc123"));
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let parts = parts_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_empty_token_rejected() {
        let parts = parts_with_auth("Bearer ");
        assert_eq!(bearer_token(&parts), None);
    }
}
