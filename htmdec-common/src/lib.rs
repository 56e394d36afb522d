//! # HTMDEC Common Library
//!
//! Shared code for the HTMDEC data services:
//! - Resource models (folders, items, files, users)
//! - Event types (HtmdecEvent enum) and the EventBus
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub use error::{Error, Result};
