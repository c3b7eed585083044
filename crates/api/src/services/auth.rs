//! Authentication service: password hashing and opaque bearer tokens.
//!
//! Passwords are hashed with Argon2id. Sessions are opaque random tokens
//! stored server-side in `auth_tokens`; there is nothing to forge and
//! revocation is a row delete.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sqlx::PgPool;
use thiserror::Error;

use bramble_core::Email;

use crate::db::{RepositoryError, UserRepository};
use crate::models::User;

/// Minimum accepted password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Bearer token entropy in bytes.
const TOKEN_BYTES: usize = 32;

/// Errors from the authentication service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password pair did not match a user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Email failed validation.
    #[error("{0}")]
    InvalidEmail(String),

    /// Password failed validation.
    #[error("{0}")]
    WeakPassword(String),

    /// Password hashing failed.
    #[error("password hashing error: {0}")]
    Hash(String),

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Hash a password with Argon2id and a fresh salt.
///
/// # Errors
///
/// Returns `AuthError::Hash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against a stored hash.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Generate an opaque bearer token: 32 random bytes, base64url.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Register a new user and issue a token.
///
/// # Errors
///
/// Returns `InvalidEmail`/`WeakPassword` on validation failure, or a
/// repository `Duplicate` error if the email is taken.
pub async fn register(
    pool: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(User, String), AuthError> {
    let email = Email::parse(email).map_err(|e| AuthError::InvalidEmail(e.to_string()))?;
    validate_password(password)?;

    let repo = UserRepository::new(pool);
    let hash = hash_password(password)?;
    let user = repo.create(name.trim(), &email, &hash).await?;

    let token = generate_token();
    repo.insert_token(user.id, &token).await?;
    Ok((user, token))
}

/// Verify credentials and issue a token.
///
/// # Errors
///
/// Returns `InvalidCredentials` for an unknown email or wrong password.
pub async fn login(pool: &PgPool, email: &str, password: &str) -> Result<(User, String), AuthError> {
    let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

    let repo = UserRepository::new(pool);
    let with_hash = match repo.get_by_email(&email).await {
        Ok(found) => found,
        Err(RepositoryError::NotFound) => return Err(AuthError::InvalidCredentials),
        Err(err) => return Err(err.into()),
    };

    if !verify_password(password, &with_hash.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    let token = generate_token();
    repo.insert_token(with_hash.user.id, &token).await?;
    Ok((with_hash.user, token))
}

/// Invalidate a bearer token.
///
/// # Errors
///
/// Returns a repository error if the delete fails.
pub async fn logout(pool: &PgPool, token: &str) -> Result<(), AuthError> {
    UserRepository::new(pool).delete_token(token).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_verify_garbage_hash_is_false() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_tokens_are_unique_and_urlsafe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }
}
