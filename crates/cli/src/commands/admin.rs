//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! bramble-cli admin create -e admin@example.com -n "Admin Name" -p "a strong password"
//! ```
//!
//! # Environment Variables
//!
//! - `BRAMBLE_DATABASE_URL` - `PostgreSQL` connection string

use bramble_api::services::auth;
use bramble_core::Email;

use super::{CommandError, connect};

/// Create an admin user, or promote an existing user to admin.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;
    let hash =
        auth::hash_password(password).map_err(|e| CommandError::Invalid(e.to_string()))?;

    let pool = connect().await?;

    let (id, created): (i32, bool) = sqlx::query_as(
        "INSERT INTO users (name, email, password_hash, is_admin) \
         VALUES ($1, $2, $3, TRUE) \
         ON CONFLICT (email) DO UPDATE SET is_admin = TRUE \
         RETURNING id, (xmax = 0)",
    )
    .bind(name)
    .bind(email.as_str())
    .bind(&hash)
    .fetch_one(&pool)
    .await?;

    if created {
        tracing::info!(user_id = id, email = %email, "admin user created");
    } else {
        tracing::info!(user_id = id, email = %email, "existing user promoted to admin");
    }
    Ok(())
}
