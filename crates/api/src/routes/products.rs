//! Product endpoints.
//!
//! Public reads are resilient: the listing degrades to an empty page when
//! the catalog is unavailable so the storefront grid renders rather than
//! erroring. Admin writes accept either a JSON body or multipart form data
//! (the admin UI submits forms with image files attached).

use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::header,
};
use serde_json::{Map, Value, json};

use bramble_core::{Envelope, Page, ProductId};

use crate::catalog::ProductListParams;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::services::uploads;
use crate::state::AppState;

/// Paginated product listing with filters and sorting.
///
/// Failures are logged and answered with an empty page.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Json<Envelope<Page<Product>>> {
    let page = match state.catalog().list_products(&params).await {
        Ok(page) => page,
        Err(err) => {
            tracing::warn!(error = %err, "product listing failed, serving empty page");
            Page::empty(params.page(), params.limit())
        }
    };
    Json(Envelope::ok(page))
}

/// A single product by ID.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Envelope<Product>>> {
    let product = state.catalog().get_product(id).await?;
    Ok(Json(Envelope::ok(product)))
}

/// A single product by slug.
pub async fn show_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<Product>>> {
    let product = state.catalog().get_product_by_slug(&slug).await?;
    Ok(Json(Envelope::ok(product)))
}

/// Create a product from a JSON or multipart body.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    request: Request,
) -> Result<Json<Envelope<Product>>> {
    let doc = extract_doc(&state, request).await?;
    let product = state.catalog().create_product(doc).await?;
    tracing::info!(product_id = %product.id, "product created");
    Ok(Json(Envelope::ok(product)))
}

/// Merge a partial update into a product.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
    request: Request,
) -> Result<Json<Envelope<Product>>> {
    let patch = extract_doc(&state, request).await?;
    let product = state.catalog().update_product(id, patch).await?;
    Ok(Json(Envelope::ok(product)))
}

/// Delete a product.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Envelope<()>>> {
    state.catalog().delete_product(id).await?;
    Ok(Json(Envelope::message("Product deleted")))
}

/// Read the request body as a JSON object, from either a JSON or a
/// multipart form body.
///
/// Multipart text fields are coerced: `true`/`false` become booleans,
/// numeric strings become numbers, and fields whose value parses as a JSON
/// array or object (the admin UI serializes `images` this way) keep their
/// structure. File parts are stored via the upload service and their public
/// URLs appended to an `images` array.
pub(crate) async fn extract_doc(state: &AppState, request: Request) -> Result<Value> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        return doc_from_multipart(state, multipart).await;
    }

    let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|e| AppError::BadRequest(format!("unreadable body: {e}")))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| AppError::BadRequest(format!("invalid JSON: {e}")))?;
    if !value.is_object() {
        return Err(AppError::BadRequest("expected a JSON object".to_owned()));
    }
    Ok(value)
}

async fn doc_from_multipart(state: &AppState, mut multipart: Multipart) -> Result<Value> {
    let mut doc = Map::new();
    let mut uploaded: Vec<Value> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_owned();

        if let Some(file_name) = field.file_name().map(ToOwned::to_owned) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            if data.is_empty() {
                continue;
            }
            let url = uploads::save_upload(&state.config().upload_dir, &file_name, &data).await?;
            uploaded.push(json!({ "url": url, "altText": "", "isPrimary": uploaded.is_empty() }));
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        doc.insert(name, coerce_field(&text));
    }

    if !uploaded.is_empty() {
        match doc.get_mut("images") {
            Some(Value::Array(existing)) => existing.extend(uploaded),
            _ => {
                doc.insert("images".to_owned(), Value::Array(uploaded));
            }
        }
    }

    Ok(Value::Object(doc))
}

/// Coerce a form text value into a typed JSON value.
pub(crate) fn coerce_field(text: &str) -> Value {
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(parsed) = serde_json::from_str::<Value>(text) {
        if parsed.is_array() || parsed.is_object() || parsed.is_number() {
            return parsed;
        }
    }
    Value::String(text.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_booleans_and_numbers() {
        assert_eq!(coerce_field("true"), Value::Bool(true));
        assert_eq!(coerce_field("false"), Value::Bool(false));
        assert_eq!(coerce_field("42"), json!(42));
        assert_eq!(coerce_field("19.99"), json!(19.99));
    }

    #[test]
    fn test_coerce_json_structures() {
        assert_eq!(coerce_field(r#"["a","b"]"#), json!(["a", "b"]));
        assert_eq!(coerce_field(r#"{"url":"/x.png"}"#), json!({"url": "/x.png"}));
    }

    #[test]
    fn test_coerce_plain_text_stays_text() {
        assert_eq!(coerce_field("Lavender Soap"), json!("Lavender Soap"));
        // quoted strings from a text input are not unwrapped
        assert_eq!(coerce_field("\"quoted\""), json!("\"quoted\""));
    }
}
