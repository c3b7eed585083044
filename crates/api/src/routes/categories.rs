//! Category endpoints.
//!
//! Reads are served through the category cache; the public listing degrades
//! to an empty list when both the database and the stale snapshot are
//! unavailable.

use axum::{
    Json,
    extract::{Path, Request, State},
};

use bramble_core::{CategoryId, Envelope};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::Category;
use crate::routes::products::extract_doc;
use crate::state::AppState;

/// All categories, cache-fronted.
pub async fn list(State(state): State<AppState>) -> Json<Envelope<Vec<Category>>> {
    let categories = match state.catalog().list_categories().await {
        Ok(categories) => categories,
        Err(err) => {
            tracing::warn!(error = %err, "category listing failed, serving empty list");
            Vec::new()
        }
    };
    Json(Envelope::ok(categories))
}

/// A single category by ID.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Envelope<Category>>> {
    let category = state.catalog().get_category(id).await?;
    Ok(Json(Envelope::ok(category)))
}

/// A single category by slug.
pub async fn show_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<Category>>> {
    let category = state.catalog().get_category_by_slug(&slug).await?;
    Ok(Json(Envelope::ok(category)))
}

/// Create a category from a JSON or multipart body.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    request: Request,
) -> Result<Json<Envelope<Category>>> {
    let doc = extract_doc(&state, request).await?;
    let category = state.catalog().create_category(doc).await?;
    tracing::info!(category_id = %category.id, "category created");
    Ok(Json(Envelope::ok(category)))
}

/// Merge a partial update into a category.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<CategoryId>,
    request: Request,
) -> Result<Json<Envelope<Category>>> {
    let patch = extract_doc(&state, request).await?;
    let category = state.catalog().update_category(id, patch).await?;
    Ok(Json(Envelope::ok(category)))
}

/// Delete a category.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Json<Envelope<()>>> {
    state.catalog().delete_category(id).await?;
    Ok(Json(Envelope::message("Category deleted")))
}
