//! User and auth-token repository.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use bramble_core::{Email, UserId};

use crate::models::User;

use super::RepositoryError;

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    password_hash: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

/// A user together with their password hash, for credential verification
/// only. Never serialized.
#[derive(Debug)]
pub struct UserWithHash {
    pub user: User,
    pub password_hash: String,
}

impl TryFrom<UserRow> for UserWithHash {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Self {
            user: User {
                id: UserId::new(row.id),
                name: row.name,
                email,
                is_admin: row.is_admin,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, email, password_hash, is_admin, created_at FROM users";

/// How long a bearer token stays valid.
const TOKEN_LIFETIME_DAYS: i64 = 30;

/// Repository for users and their bearer tokens.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` if the email is taken.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING id, name, email, password_hash, is_admin, created_at",
        )
        .bind(name)
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        Ok(UserWithHash::try_from(row)?.user)
    }

    /// Look up a user (with hash) by email for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this email.
    pub async fn get_by_email(&self, email: &Email) -> Result<UserWithHash, RepositoryError> {
        sqlx::query_as::<_, UserRow>(&format!("{SELECT_COLUMNS} WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?
            .try_into()
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn get(&self, id: UserId) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(UserWithHash::try_from(row)?.user)
    }

    /// Store a bearer token for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_token(&self, user_id: UserId, token: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO auth_tokens (user_id, token, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id.as_i32())
        .bind(token)
        .bind(Utc::now() + Duration::days(TOKEN_LIFETIME_DAYS))
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Resolve an unexpired bearer token to its user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown or expired tokens.
    pub async fn get_by_token(&self, token: &str) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.name, u.email, u.password_hash, u.is_admin, u.created_at \
             FROM users u JOIN auth_tokens t ON t.user_id = u.id \
             WHERE t.token = $1 AND t.expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(UserWithHash::try_from(row)?.user)
    }

    /// Delete a bearer token (logout). Deleting an unknown token is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_token(&self, token: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM auth_tokens WHERE token = $1")
            .bind(token)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
