//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client with the JSON envelope. All route
//! handlers return `Result<T, AppError>`.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use bramble_core::Envelope;

use crate::catalog::CatalogError;
use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::uploads::UploadError;

/// Whether 500 responses include the underlying error message. Set once at
/// startup from `ApiConfig::development`; production responses stay opaque.
static INCLUDE_DETAIL: AtomicBool = AtomicBool::new(false);

/// Enable or disable error detail in 500 responses.
pub fn set_include_detail(include: bool) {
    INCLUDE_DETAIL.store(include, Ordering::Relaxed);
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Upload handling failed.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request origin rejected or actor lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(err) => catalog_status(err),
            Self::Database(err) => repository_status(err),
            Self::Auth(err) => auth_status(err),
            Self::Upload(err) => match err {
                UploadError::UnsupportedType(_) | UploadError::TooLarge { .. } => {
                    StatusCode::BAD_REQUEST
                }
                UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message exposed to clients. Server errors stay opaque unless
    /// detail is enabled (development mode).
    fn client_message(&self) -> String {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            if INCLUDE_DETAIL.load(Ordering::Relaxed) {
                return self.to_string();
            }
            return "Internal server error".to_owned();
        }

        match self {
            Self::Catalog(CatalogError::Repository(err)) | Self::Database(err) => {
                repository_message(err)
            }
            Self::Catalog(CatalogError::Validation(msg)) => msg.clone(),
            Self::Auth(err) => auth_message(err),
            Self::Upload(err) => err.to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg) => msg.clone(),
            _ => self.to_string(),
        }
    }
}

const fn catalog_status(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::Repository(repo) => repository_status(repo),
        CatalogError::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
    }
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Duplicate { .. } => StatusCode::BAD_REQUEST,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn repository_message(err: &RepositoryError) -> String {
    match err {
        RepositoryError::NotFound => "Resource not found".to_owned(),
        RepositoryError::Duplicate { field } => format!("Duplicate value for field: {field}"),
        _ => "Internal server error".to_owned(),
    }
}

const fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
        AuthError::Repository(repo) => match repo {
            RepositoryError::NotFound => StatusCode::UNAUTHORIZED,
            RepositoryError::Duplicate { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        AuthError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn auth_message(err: &AuthError) -> String {
    match err {
        AuthError::InvalidCredentials | AuthError::Repository(RepositoryError::NotFound) => {
            "Invalid credentials".to_owned()
        }
        AuthError::Repository(RepositoryError::Duplicate { .. }) => {
            "An account with this email already exists".to_owned()
        }
        AuthError::InvalidEmail(msg) | AuthError::WeakPassword(msg) => msg.clone(),
        _ => "Authentication error".to_owned(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = Envelope::<()>::err(self.client_message());
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_maps_to_400_with_field() {
        let err = AppError::Database(RepositoryError::Duplicate {
            field: "slug".to_owned(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.client_message().contains("slug"));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AppError::Catalog(CatalogError::Repository(RepositoryError::NotFound));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_detail_redacted_by_default() {
        let err = AppError::Internal("secret db string".to_owned());
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err = AppError::Catalog(CatalogError::Validation("name is required".to_owned()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "name is required");
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let err = AppError::Forbidden("origin not allowed".to_owned());
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
