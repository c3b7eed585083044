//! Product repository.
//!
//! Products are stored as JSONB documents alongside a unique slug column and
//! audit timestamps. Filtering and sorting happen in SQL over the document
//! fields, coalesced with the same defaults the normalization layer applies,
//! so a row with a missing flag filters the way its normalized view reads.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::catalog::query::ProductListParams;

use super::RepositoryError;

/// A raw product row; the catalog layer normalizes `doc` into a view.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i32,
    pub slug: String,
    pub doc: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str = "SELECT id, slug, doc, created_at, updated_at FROM products";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count and fetch one page of products matching `params`.
    ///
    /// Returns the rows for the (clamped) requested page plus the overall
    /// match count. The count runs first so the offset is computed against
    /// the clamped page rather than pointing past the end.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn list(
        &self,
        params: &ProductListParams,
    ) -> Result<(Vec<ProductRow>, u64), RepositoryError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_filters(&mut count_qb, params);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;
        let total = u64::try_from(total).unwrap_or(0);

        let limit = params.limit();
        let total_pages = bramble_core::page::total_pages(total, limit);
        let page = params.page().min(total_pages);
        let offset = i64::from(page - 1) * i64::from(limit);

        let (sort_key, sort_dir) = params.sort();

        let mut qb = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        push_filters(&mut qb, params);
        qb.push(" ORDER BY ")
            .push(sort_key.sql_expr())
            .push(" ")
            .push(sort_dir.sql_keyword())
            .push(", id ASC")
            .push(" LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn get(&self, id: i32) -> Result<ProductRow, RepositoryError> {
        sqlx::query_as::<_, ProductRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Get a product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn get_by_slug(&self, slug: &str) -> Result<ProductRow, RepositoryError> {
        sqlx::query_as::<_, ProductRow>(&format!("{SELECT_COLUMNS} WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Insert a new product document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` on slug collision.
    pub async fn create(&self, slug: &str, doc: &JsonValue) -> Result<ProductRow, RepositoryError> {
        sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products (slug, doc) VALUES ($1, $2) \
             RETURNING id, slug, doc, created_at, updated_at",
        )
        .bind(slug)
        .bind(doc)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    /// Replace a product document.
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
    ) -> Result<ProductRow, RepositoryError> {
        sqlx::query_as::<_, ProductRow>(
            "UPDATE products SET slug = $2, doc = $3, updated_at = NOW() WHERE id = $1 \
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

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Append WHERE conditions for `params` to a query builder.
///
/// Shared between the count and page queries so the two can never disagree
/// about what matches.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, params: &ProductListParams) {
    qb.push(" WHERE 1=1");

    if let Some(term) = params.search_term() {
        // escape LIKE metacharacters in user input
        let escaped = format!(
            "%{}%",
            term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
        );
        qb.push(" AND (doc->>'name' ILIKE ")
            .push_bind(escaped.clone())
            .push(" OR doc->>'description' ILIKE ")
            .push_bind(escaped.clone())
            .push(" OR doc->>'sku' ILIKE ")
            .push_bind(escaped)
            .push(")");
    }

    if let Some(category) = params.category {
        qb.push(" AND (doc->>'categoryId')::int = ").push_bind(category);
    }

    if let Some(active) = params.active {
        qb.push(" AND COALESCE((doc->>'isActive')::boolean, true) = ")
            .push_bind(active);
    }

    if let Some(featured) = params.featured {
        qb.push(" AND COALESCE((doc->>'isFeatured')::boolean, false) = ")
            .push_bind(featured);
    }

    if let Some(best_seller) = params.best_seller {
        qb.push(" AND COALESCE((doc->>'isBestSeller')::boolean, false) = ")
            .push_bind(best_seller);
    }

    if let Some(min_price) = params.min_price {
        qb.push(" AND COALESCE((doc->>'price')::numeric, 0) >= ")
            .push_bind(min_price);
    }

    if let Some(max_price) = params.max_price {
        qb.push(" AND COALESCE((doc->>'price')::numeric, 0) <= ")
            .push_bind(max_price);
    }
}
