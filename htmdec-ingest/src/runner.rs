//! Import invocation surface
//!
//! Validates the request before touching the store, then runs one walk
//! inside a scoped [`ProgressContext`].

use htmdec_common::events::EventBus;
use htmdec_common::models::{ParentRef, ParentType, User};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

use crate::adapter::StorageAdapter;
use crate::error::{ImportError, ImportResult};
use crate::importer::{ImportContext, ImportStats, Importer, Strategy};
use crate::params::{DataType, ImportParams, RawImportParams};
use crate::store::HierarchyStore;

/// One import invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    /// `sem` or `pdv`
    pub data_type: String,
    pub destination_id: Uuid,
    /// Must be `folder`
    pub destination_type: String,
    pub import_path: PathBuf,
    #[serde(default)]
    pub progress: bool,
    #[serde(default)]
    pub params: RawImportParams,
}

/// Result of a successful import
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub progress_id: Uuid,
    pub data_type: DataType,
    pub destination_id: Uuid,
    pub stats: ImportStats,
}

/// Shared collaborators of every import
pub struct ImportEnv<'a> {
    pub store: &'a dyn HierarchyStore,
    pub adapter: &'a dyn StorageAdapter,
    pub user: &'a User,
    pub events: &'a EventBus,
    /// Configured exclusion merged into every request
    pub default_exclude: Option<&'a str>,
}

/// Validate `request` and import its directory tree
///
/// Configuration errors are returned before any store mutation. Errors
/// during the walk abort it; work already committed stays.
pub fn run_import(env: &ImportEnv<'_>, request: ImportRequest) -> ImportResult<ImportSummary> {
    let data_type: DataType = request.data_type.parse()?;

    let destination_type: ParentType = request
        .destination_type
        .parse()
        .map_err(|_| ImportError::InvalidDestination(data_type.to_string()))?;
    if destination_type != ParentType::Folder {
        return Err(ImportError::InvalidDestination(data_type.to_string()));
    }

    let import_path = request.import_path;
    if !import_path.exists() {
        return Err(ImportError::PathNotFound(import_path));
    }
    if !import_path.is_dir() {
        return Err(ImportError::NotADirectory(import_path));
    }

    let params = ImportParams::resolve(request.params, env.default_exclude)?;
    let destination = env.store.load_folder(request.destination_id)?;

    info!(
        data_type = %data_type,
        destination = %destination.id,
        path = %import_path.display(),
        exclude = params.exclude_pattern(),
        "Starting import"
    );

    let progress = crate::progress::ProgressContext::open(
        request.progress,
        format!("{} data import", data_type),
        env.user,
        env.events.clone(),
    );
    let progress_id = progress.id();

    let ctx = ImportContext::new(
        env.store,
        env.adapter,
        env.user,
        &progress,
        env.events,
        &params,
    );
    let importer = Importer::new(ctx, Strategy::for_data_type(data_type));
    let result = importer.import_data(&ParentRef::folder(destination.id), &import_path);
    let stats = importer.stats();
    drop(importer);
    progress.close(result.is_ok());

    match result {
        Ok(()) => {
            info!(
                data_type = %data_type,
                items = stats.items_imported,
                folders = stats.folders_mirrored,
                files = stats.files_ingested,
                missing_headers = stats.missing_headers,
                "Import finished"
            );
            Ok(ImportSummary {
                progress_id,
                data_type,
                destination_id: destination.id,
                stats,
            })
        }
        Err(e) => {
            warn!(data_type = %data_type, error = %e, "Import aborted");
            Err(e)
        }
    }
}
