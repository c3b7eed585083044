//! Database operations for the Bramble Goods PostgreSQL database.
//!
//! # Tables
//!
//! - `products` - catalog documents (JSONB `doc` column + slug/audit columns)
//! - `categories` - catalog documents, same shape
//! - `slides` - homepage slider entries
//! - `users` / `auth_tokens` - accounts and opaque bearer tokens
//! - `orders` - relational order rows with JSONB item/address snapshots
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p bramble-cli -- migrate
//! ```
//! They are never run automatically on server startup.

pub mod categories;
pub mod orders;
pub mod products;
pub mod slides;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use orders::{AdminOrderPatch, NewOrder, OrderListFilter, OrderRepository};
pub use products::ProductRepository;
pub use slides::{SlideInput, SlideRepository};
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation, naming the offending field.
    #[error("duplicate value for field: {field}")]
    Duplicate { field: String },
}

impl RepositoryError {
    /// Convert a sqlx error, mapping unique violations (SQLSTATE 23505) to
    /// [`RepositoryError::Duplicate`] with the field derived from the
    /// constraint name (`products_slug_key` -> `slug`).
    #[must_use]
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.code().as_deref() == Some("23505")
        {
            let field = db_err
                .constraint()
                .map_or_else(|| "unknown".to_owned(), constraint_field);
            return Self::Duplicate { field };
        }
        Self::Database(err)
    }
}

/// Extract the column name from a PostgreSQL unique-constraint name.
///
/// Default-named constraints look like `<table>_<column>_key`.
fn constraint_field(constraint: &str) -> String {
    let trimmed = constraint.strip_suffix("_key").unwrap_or(constraint);
    trimmed
        .split_once('_')
        .map_or(trimmed, |(_, rest)| rest)
        .to_owned()
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_field_default_naming() {
        assert_eq!(constraint_field("products_slug_key"), "slug");
        assert_eq!(constraint_field("users_email_key"), "email");
        assert_eq!(constraint_field("orders_order_number_key"), "order_number");
    }

    #[test]
    fn test_constraint_field_unrecognized() {
        assert_eq!(constraint_field("weird"), "weird");
    }
}
