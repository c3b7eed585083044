//! Homepage slider repository.
//!
//! Slides are small and fully structured, so they get plain relational
//! columns rather than the document treatment the catalog needs.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bramble_core::SlideId;

use crate::models::Slide;

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct SlideRow {
    id: i32,
    title: String,
    subtitle: String,
    image: String,
    link: String,
    position: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SlideRow> for Slide {
    fn from(row: SlideRow) -> Self {
        Self {
            id: SlideId::new(row.id),
            title: row.title,
            subtitle: row.subtitle,
            image: row.image,
            link: row.link,
            position: row.position,
            is_active: row.is_active,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// Fields for creating or replacing a slide.
#[derive(Debug)]
pub struct SlideInput {
    pub title: String,
    pub subtitle: String,
    pub image: String,
    pub link: String,
    pub position: i32,
    pub is_active: bool,
}

const SELECT_COLUMNS: &str =
    "SELECT id, title, subtitle, image, link, position, is_active, created_at, updated_at \
     FROM slides";

/// Repository for homepage slider entries.
pub struct SlideRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SlideRepository<'a> {
    /// Create a new slide repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active slides in display order (public endpoint).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Slide>, RepositoryError> {
        let rows = sqlx::query_as::<_, SlideRow>(&format!(
            "{SELECT_COLUMNS} WHERE is_active ORDER BY position, id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// All slides, including inactive (admin endpoint).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Slide>, RepositoryError> {
        let rows = sqlx::query_as::<_, SlideRow>(&format!(
            "{SELECT_COLUMNS} ORDER BY position, id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a slide.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &SlideInput) -> Result<Slide, RepositoryError> {
        let row = sqlx::query_as::<_, SlideRow>(
            "INSERT INTO slides (title, subtitle, image, link, position, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, title, subtitle, image, link, position, is_active, \
                 created_at, updated_at",
        )
        .bind(&input.title)
        .bind(&input.subtitle)
        .bind(&input.image)
        .bind(&input.link)
        .bind(input.position)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// Replace a slide.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn update(&self, id: SlideId, input: &SlideInput) -> Result<Slide, RepositoryError> {
        let row = sqlx::query_as::<_, SlideRow>(
            "UPDATE slides SET title = $2, subtitle = $3, image = $4, link = $5, \
                 position = $6, is_active = $7, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, title, subtitle, image, link, position, is_active, \
                 created_at, updated_at",
        )
        .bind(id.as_i32())
        .bind(&input.title)
        .bind(&input.subtitle)
        .bind(&input.image)
        .bind(&input.link)
        .bind(input.position)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// Get a single slide.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn get(&self, id: SlideId) -> Result<Slide, RepositoryError> {
        let row = sqlx::query_as::<_, SlideRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// Delete a slide.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn delete(&self, id: SlideId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM slides WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
