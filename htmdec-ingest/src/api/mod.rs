//! HTTP API handlers for htmdec-ingest

pub mod folders;
pub mod health;
pub mod import;
pub mod items;
pub mod sse;

pub use folders::folder_routes;
pub use health::health_routes;
pub use import::import_routes;
pub use items::item_routes;
pub use sse::event_stream;
