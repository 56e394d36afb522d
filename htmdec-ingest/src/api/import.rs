//! Import API handler
//!
//! POST /import runs one import to completion on the blocking pool and
//! answers with its summary. Progress streams over `/events` meanwhile.

use axum::{extract::State, routing::post, Json, Router};
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::runner::{run_import, ImportEnv, ImportRequest, ImportSummary};
use crate::AppState;

/// POST /import
pub async fn start_import(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> ApiResult<Json<ImportSummary>> {
    info!(
        data_type = %request.data_type,
        path = %request.import_path.display(),
        destination = %request.destination_id,
        "Import requested"
    );

    let summary = tokio::task::spawn_blocking(move || {
        let env = ImportEnv {
            store: state.store.as_ref(),
            adapter: state.adapter.as_ref(),
            user: &state.user,
            events: &state.event_bus,
            default_exclude: state.default_exclude.as_deref(),
        };
        run_import(&env, request)
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Import task panicked");
        ApiError::Internal(format!("Import task failed: {}", e))
    })??;

    Ok(Json(summary))
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new().route("/import", post(start_import))
}
