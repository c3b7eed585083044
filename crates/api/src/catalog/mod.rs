//! Catalog query layer: products and categories.
//!
//! Sits between the HTTP handlers and the repositories. Responsible for
//! read-side normalization of stored documents, the category cache, and the
//! deadline on the product listing path. Handlers talk to [`CatalogService`];
//! they never touch catalog rows directly.

pub mod cache;
pub mod normalize;
pub mod query;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use sqlx::PgPool;
use thiserror::Error;

use bramble_core::{CategoryId, Page, ProductId};

use crate::db::categories::CategoryRow;
use crate::db::products::ProductRow;
use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::models::{Category, Product};

use cache::{CategoryCache, Clock, SystemClock};
use normalize::{normalize_category, normalize_product, slugify};

pub use query::ProductListParams;

/// Deadline for the backing query on the product listing path. A listing
/// that blows past this degrades to an empty page instead of stalling page
/// generation.
pub const LIST_TIMEOUT: Duration = Duration::from_secs(3);

/// Errors from the catalog layer.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The listing query exceeded its deadline. Distinguishable from an
    /// empty result on purpose; only the handler boundary may degrade it.
    #[error("catalog query timed out after {0:?}")]
    Timeout(Duration),

    /// Input failed validation before reaching storage.
    #[error("validation failed: {0}")]
    Validation(String),
}

/// Catalog service: product/category reads and writes, cache-fronted
/// category lookups.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    pool: PgPool,
    cache: CategoryCache,
}

impl CatalogService {
    /// Create a catalog service with the given cache configuration.
    #[must_use]
    pub fn new(pool: PgPool, cache_ttl: Duration, cache_capacity: u64) -> Self {
        Self::with_clock(pool, cache_ttl, cache_capacity, Arc::new(SystemClock))
    }

    /// Create a catalog service with an injected clock (tests).
    #[must_use]
    pub fn with_clock(
        pool: PgPool,
        cache_ttl: Duration,
        cache_capacity: u64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(CatalogServiceInner {
                pool,
                cache: CategoryCache::new(cache_ttl, cache_capacity, clock),
            }),
        }
    }

    fn products(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.inner.pool)
    }

    fn categories(&self) -> CategoryRepository<'_> {
        CategoryRepository::new(&self.inner.pool)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// One page of products matching `params`, normalized.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Timeout` if the backing query exceeds
    /// [`LIST_TIMEOUT`], or a repository error if it fails.
    pub async fn list_products(
        &self,
        params: &ProductListParams,
    ) -> Result<Page<Product>, CatalogError> {
        let (rows, total) = tokio::time::timeout(LIST_TIMEOUT, self.products().list(params))
            .await
            .map_err(|_| CatalogError::Timeout(LIST_TIMEOUT))??;

        let items = rows.into_iter().map(product_view).collect();
        Ok(Page::new(items, total, params.page(), params.limit()))
    }

    /// A single product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` via `CatalogError::Repository`.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        Ok(product_view(self.products().get(id.as_i32()).await?))
    }

    /// A single product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` via `CatalogError::Repository`.
    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Product, CatalogError> {
        Ok(product_view(self.products().get_by_slug(slug).await?))
    }

    /// Create a product from an incoming document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if the document has no usable
    /// name/slug, or `Duplicate` on slug collision.
    pub async fn create_product(&self, doc: JsonValue) -> Result<Product, CatalogError> {
        let slug = derive_slug(&doc)?;
        Ok(product_view(self.products().create(&slug, &doc).await?))
    }

    /// Merge a partial document into an existing product and store it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing product, `Validation` if the merged
    /// document loses its name/slug, or `Duplicate` on slug collision.
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: JsonValue,
    ) -> Result<Product, CatalogError> {
        let existing = self.products().get(id.as_i32()).await?;
        let mut doc = existing.doc;
        merge_doc(&mut doc, patch);
        let slug = derive_slug(&doc)?;
        Ok(product_view(
            self.products().update(id.as_i32(), &slug, &doc).await?,
        ))
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no product matches.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        self.products().delete(id.as_i32()).await?;
        Ok(())
    }

    // =========================================================================
    // Categories (cache-fronted reads)
    // =========================================================================

    /// All categories, from cache when fresh.
    ///
    /// On a fetch failure this falls back to the last cached snapshot if one
    /// exists, preferring availability over freshness.
    ///
    /// # Errors
    ///
    /// Returns a repository error only when the fetch fails and no snapshot
    /// is held at all.
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        if let Some(cached) = self.inner.cache.get_all().await {
            return Ok(cached);
        }

        match self.categories().list_all().await {
            Ok(rows) => {
                let categories: Vec<Category> = rows.into_iter().map(category_view).collect();
                self.inner.cache.put_all(categories.clone()).await;
                Ok(categories)
            }
            Err(err) => {
                if let Some(stale) = self.inner.cache.get_all_stale().await {
                    tracing::warn!(error = %err, "category fetch failed, serving stale snapshot");
                    return Ok(stale);
                }
                Err(err.into())
            }
        }
    }

    /// A single category by ID, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no category matches.
    pub async fn get_category(&self, id: CategoryId) -> Result<Category, CatalogError> {
        let key = format!("id:{id}");
        if let Some(cached) = self.inner.cache.get(&key).await {
            return Ok(cached);
        }
        let category = category_view(self.categories().get(id.as_i32()).await?);
        self.inner.cache.put(key, category.clone()).await;
        Ok(category)
    }

    /// A single category by slug, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no category matches.
    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Category, CatalogError> {
        let key = format!("slug:{slug}");
        if let Some(cached) = self.inner.cache.get(&key).await {
            return Ok(cached);
        }
        let category = category_view(self.categories().get_by_slug(slug).await?);
        self.inner.cache.put(key, category.clone()).await;
        Ok(category)
    }

    /// Create a category. Clears the cache.
    ///
    /// # Errors
    ///
    /// Returns `Validation` or `Duplicate` as for products.
    pub async fn create_category(&self, doc: JsonValue) -> Result<Category, CatalogError> {
        let slug = derive_slug(&doc)?;
        let category = category_view(self.categories().create(&slug, &doc).await?);
        self.inner.cache.clear().await;
        Ok(category)
    }

    /// Merge a partial document into an existing category. Clears the cache.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Validation`, or `Duplicate`.
    pub async fn update_category(
        &self,
        id: CategoryId,
        patch: JsonValue,
    ) -> Result<Category, CatalogError> {
        let existing = self.categories().get(id.as_i32()).await?;
        let mut doc = existing.doc;
        merge_doc(&mut doc, patch);
        if doc.get("parentId").and_then(JsonValue::as_i64) == Some(i64::from(id.as_i32())) {
            return Err(CatalogError::Validation(
                "category cannot be its own parent".to_owned(),
            ));
        }
        let slug = derive_slug(&doc)?;
        let category = category_view(self.categories().update(id.as_i32(), &slug, &doc).await?);
        self.inner.cache.clear().await;
        Ok(category)
    }

    /// Delete a category. Clears the cache.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no category matches.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), CatalogError> {
        self.categories().delete(id.as_i32()).await?;
        self.inner.cache.clear().await;
        Ok(())
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}

/// Normalize a product row into its view, logging any defaulted fields. The
/// slug column and audit timestamps are authoritative over the document.
fn product_view(row: ProductRow) -> Product {
    let normalized = normalize_product(Some(&row.doc));
    if !normalized.is_clean() {
        tracing::debug!(
            product_id = row.id,
            defaulted = ?normalized.defaulted,
            "product document had defaulted fields"
        );
    }
    let mut product = normalized.value;
    product.id = ProductId::new(row.id);
    product.slug = row.slug;
    product.created_at = Some(row.created_at);
    product.updated_at = Some(row.updated_at);
    product
}

/// Normalize a category row into its view, logging any defaulted fields.
fn category_view(row: CategoryRow) -> Category {
    let normalized = normalize_category(Some(&row.doc));
    if !normalized.is_clean() {
        tracing::debug!(
            category_id = row.id,
            defaulted = ?normalized.defaulted,
            "category document had defaulted fields"
        );
    }
    let mut category = normalized.value;
    category.id = CategoryId::new(row.id);
    category.slug = row.slug;
    category.created_at = Some(row.created_at);
    category.updated_at = Some(row.updated_at);
    category
}

/// Derive the slug column value from an incoming document: an explicit
/// `slug` wins, else the name is slugified.
fn derive_slug(doc: &JsonValue) -> Result<String, CatalogError> {
    let explicit = doc.get("slug").and_then(JsonValue::as_str).map(slugify);
    let derived = explicit.filter(|s| !s.is_empty()).or_else(|| {
        doc.get("name")
            .and_then(JsonValue::as_str)
            .map(slugify)
            .filter(|s| !s.is_empty())
    });
    derived.ok_or_else(|| CatalogError::Validation("name is required".to_owned()))
}

/// Merge `patch` into `doc` at the top level. Only object patches merge;
/// anything else replaces the document wholesale. A `null` value removes
/// the field, matching PATCH-style clears.
fn merge_doc(doc: &mut JsonValue, patch: JsonValue) {
    match (doc.as_object_mut(), patch) {
        (Some(target), JsonValue::Object(fields)) => {
            for (key, value) in fields {
                if value.is_null() {
                    target.remove(&key);
                } else {
                    target.insert(key, value);
                }
            }
        }
        (_, patch) => *doc = patch,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_derive_slug_prefers_explicit() {
        let doc = json!({"name": "Enamel Mug", "slug": "Custom Slug"});
        assert_eq!(derive_slug(&doc).unwrap(), "custom-slug");
    }

    #[test]
    fn test_derive_slug_from_name() {
        let doc = json!({"name": "Enamel Mug"});
        assert_eq!(derive_slug(&doc).unwrap(), "enamel-mug");
    }

    #[test]
    fn test_derive_slug_requires_name() {
        assert!(matches!(
            derive_slug(&json!({})),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn test_merge_doc_overwrites_and_removes() {
        let mut doc = json!({"name": "Mug", "price": 10, "sku": "A"});
        merge_doc(&mut doc, json!({"price": 12, "sku": null, "stock": 5}));
        assert_eq!(doc, json!({"name": "Mug", "price": 12, "stock": 5}));
    }

    #[test]
    fn test_merge_doc_non_object_replaces() {
        let mut doc = json!({"name": "Mug"});
        merge_doc(&mut doc, json!({"name": "Cup"}));
        assert_eq!(doc["name"], "Cup");
    }
}
