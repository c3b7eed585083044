//! Category repository.
//!
//! Same document storage as products: a JSONB `doc` plus a unique slug.
//! Categories are few, so the list query has no pagination; ordering is by
//! name for stable menus.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::RepositoryError;

/// A raw category row; the catalog layer normalizes `doc` into a view.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i32,
    pub slug: String,
    pub doc: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "SELECT id, slug, doc, created_at, updated_at FROM categories";

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<CategoryRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY COALESCE(doc->>'name', ''), id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn get(&self, id: i32) -> Result<CategoryRow, RepositoryError> {
        sqlx::query_as::<_, CategoryRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Get a category by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryRow, RepositoryError> {
        sqlx::query_as::<_, CategoryRow>(&format!("{SELECT_COLUMNS} WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Insert a new category document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` on slug collision.
    pub async fn create(&self, slug: &str, doc: &JsonValue) -> Result<CategoryRow, RepositoryError> {
        sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (slug, doc) VALUES ($1, $2) \
             RETURNING id, slug, doc, created_at, updated_at",
        )
        .bind(slug)
        .bind(doc)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    /// Replace a category document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches, or
    /// `RepositoryError::Duplicate` on slug collision.
    pub async fn update(
        &self,
        id: i32,
        slug: &str,
        doc: &JsonValue,
    ) -> Result<CategoryRow, RepositoryError> {
        sqlx::query_as::<_, CategoryRow>(
            "UPDATE categories SET slug = $2, doc = $3, updated_at = NOW() WHERE id = $1 \
             RETURNING id, slug, doc, created_at, updated_at",
        )
        .bind(id)
        .bind(slug)
        .bind(doc)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
