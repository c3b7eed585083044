//! Homepage slider endpoints.
//!
//! Admin writes accept a JSON body or multipart form data with the slide
//! image attached as a file part.

use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::header,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use bramble_core::{Envelope, SlideId};

use crate::db::{SlideInput, SlideRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Slide;
use crate::routes::products::coerce_field;
use crate::services::uploads;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideRequest {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub image: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl From<SlideRequest> for SlideInput {
    fn from(req: SlideRequest) -> Self {
        Self {
            title: req.title,
            subtitle: req.subtitle,
            image: req.image,
            link: req.link,
            position: req.position,
            is_active: req.is_active,
        }
    }
}

/// Active slides in position order, for the storefront homepage.
pub async fn list_active(State(state): State<AppState>) -> Result<Json<Envelope<Vec<Slide>>>> {
    let slides = SlideRepository::new(state.pool()).list_active().await?;
    Ok(Json(Envelope::ok(slides)))
}

/// All slides, including inactive, for the admin UI.
pub async fn list_all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Envelope<Vec<Slide>>>> {
    let slides = SlideRepository::new(state.pool()).list_all().await?;
    Ok(Json(Envelope::ok(slides)))
}

/// Create a slide from a JSON or multipart body.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    request: Request,
) -> Result<Json<Envelope<Slide>>> {
    let req = slide_request_from(&state, request).await?;
    let slide = SlideRepository::new(state.pool())
        .create(&req.into())
        .await?;
    Ok(Json(Envelope::ok(slide)))
}

/// Replace a slide.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<SlideId>,
    request: Request,
) -> Result<Json<Envelope<Slide>>> {
    let req = slide_request_from(&state, request).await?;
    let slide = SlideRepository::new(state.pool())
        .update(id, &req.into())
        .await?;
    Ok(Json(Envelope::ok(slide)))
}

/// Read a [`SlideRequest`] from either a JSON or a multipart form body.
///
/// In the multipart case a file part becomes the slide image URL via the
/// upload service; only `position` and `isActive` are coerced out of text,
/// every other field stays a string.
async fn slide_request_from(state: &AppState, request: Request) -> Result<SlideRequest> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let mut doc = Map::new();
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
                let url =
                    uploads::save_upload(&state.config().upload_dir, &file_name, &data).await?;
                doc.insert("image".to_owned(), Value::String(url));
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            let value = match name.as_str() {
                "position" | "isActive" => coerce_field(&text),
                _ => Value::String(text),
            };
            doc.insert(name, value);
        }

        return serde_json::from_value(Value::Object(doc))
            .map_err(|e| AppError::BadRequest(format!("invalid slide: {e}")));
    }

    let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|e| AppError::BadRequest(format!("unreadable body: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::BadRequest(format!("invalid slide: {e}")))
}

/// Delete a slide.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<SlideId>,
) -> Result<Json<Envelope<()>>> {
    SlideRepository::new(state.pool()).delete(id).await?;
    Ok(Json(Envelope::message("Slide deleted")))
}
