//! htmdec-ingest library interface
//!
//! Bulk import of SEM and PDV instrument data into a folder/item store,
//! plus the HTTP routes exposing it.

pub mod adapter;
pub mod api;
pub mod error;
pub mod hierarchy;
pub mod importer;
pub mod params;
pub mod progress;
pub mod runner;
pub mod sniffer;
pub mod store;
pub mod tiff_meta;

pub use crate::error::{ApiError, ApiResult, ImportError, ImportResult};
pub use crate::runner::{run_import, ImportEnv, ImportRequest, ImportSummary};

use axum::Router;
use chrono::{DateTime, Utc};
use htmdec_common::events::EventBus;
use htmdec_common::models::User;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::adapter::{FilesystemAdapter, StorageAdapter};
use crate::store::HierarchyStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HierarchyStore>,
    pub adapter: Arc<dyn StorageAdapter>,
    /// Notification bus, also feeding SSE clients
    pub event_bus: EventBus,
    /// Identity every request acts as
    pub user: User,
    /// Exclusion merged into every import
    pub default_exclude: Option<String>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// State with a [`FilesystemAdapter`] over `store`
    pub fn new(store: Arc<dyn HierarchyStore>, event_bus: EventBus, user: User) -> Self {
        Self {
            adapter: Arc::new(FilesystemAdapter::new(store.clone())),
            store,
            event_bus,
            user,
            default_exclude: None,
            startup_time: Utc::now(),
        }
    }

    pub fn with_default_exclude(mut self, pattern: Option<String>) -> Self {
        self.default_exclude = pattern;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::import_routes())
        .merge(api::folder_routes())
        .merge(api::item_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
