//! Folder API handlers

use axum::{extract::State, routing::post, Json, Router};
use htmdec_common::models::{Folder, ParentRef, ParentType};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::hierarchy::create_folders;
use crate::AppState;

/// POST /folder/recursive request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFoldersRequest {
    pub parent_id: Uuid,
    pub parent_type: ParentType,
    /// `/`-separated folder names
    pub path: String,
}

/// POST /folder/recursive
///
/// Get-or-create every segment of `path`; returns the deepest folder.
pub async fn create_folders_recursive(
    State(state): State<AppState>,
    Json(request): Json<CreateFoldersRequest>,
) -> ApiResult<Json<Folder>> {
    let parent = ParentRef {
        id: request.parent_id,
        parent_type: request.parent_type,
    };
    let folder = create_folders(state.store.as_ref(), parent, &request.path, &state.user)?;
    Ok(Json(folder))
}

/// Build folder routes
pub fn folder_routes() -> Router<AppState> {
    Router::new().route("/folder/recursive", post(create_folders_recursive))
}
