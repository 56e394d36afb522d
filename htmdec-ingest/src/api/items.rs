//! Item accessor handlers: SEM header text and thumbnails

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::tiff_meta::{item_header, item_thumbnail};
use crate::AppState;

/// GET /item/:id/tiff_metadata
///
/// Plain-text header; 204 when the item has no files.
pub async fn tiff_metadata(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<Response> {
    let item = state.store.load_item(item_id)?;
    let response = match item_header(state.store.as_ref(), &item) {
        Some(text) => ([(header::CONTENT_TYPE, "text/plain")], text).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    };
    Ok(response)
}

/// GET /item/:id/tiff_thumbnail
///
/// Base64 PNG as a JSON string, or `null` when no thumbnail can be made.
pub async fn tiff_thumbnail(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<Json<Option<String>>> {
    let item = state.store.load_item(item_id)?;
    let thumbnail =
        tokio::task::spawn_blocking(move || item_thumbnail(state.store.as_ref(), &item))
            .await
            .map_err(|e| ApiError::Internal(format!("Thumbnail task failed: {}", e)))?;
    Ok(Json(thumbnail))
}

/// Build item routes
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/item/:id/tiff_metadata", get(tiff_metadata))
        .route("/item/:id/tiff_thumbnail", get(tiff_thumbnail))
}
