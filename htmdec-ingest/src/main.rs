//! htmdec-ingest - SEM/PDV bulk ingest service
//!
//! `serve` exposes the import, folder, item and event routes over HTTP.
//! `import` runs one import into a fresh in-memory folder and prints the
//! summary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use htmdec_common::config::TomlConfig;
use htmdec_common::events::EventBus;
use htmdec_common::models::{ParentRef, ParentType, User};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use htmdec_ingest::adapter::FilesystemAdapter;
use htmdec_ingest::params::RawImportParams;
use htmdec_ingest::store::{HierarchyStore, MemoryStore};
use htmdec_ingest::{run_import, AppState, ImportEnv, ImportRequest};

/// Command-line arguments for htmdec-ingest
#[derive(Parser, Debug)]
#[command(name = "htmdec-ingest")]
#[command(about = "Bulk import of SEM and PDV instrument data")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Bind address, overriding the configuration
        #[arg(short, long, env = "HTMDEC_BIND")]
        bind: Option<String>,
    },
    /// Import a directory once and print the summary
    Import {
        /// Data type: sem or pdv
        #[arg(short, long)]
        data_type: String,

        /// Extra file-name exclusion pattern
        #[arg(long)]
        exclude: Option<String>,

        /// Directory to import
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::resolve(args.config.as_deref()).context("Failed to load configuration")?;

    let level = &config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("htmdec_ingest={},tower_http={}", level, level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match args.command {
        Command::Serve { bind } => serve(config, bind).await,
        Command::Import {
            data_type,
            exclude,
            path,
        } => {
            tokio::task::spawn_blocking(move || import_once(&config, data_type, exclude, path))
                .await
                .context("Import task failed")?
        }
    }
}

async fn serve(config: TomlConfig, bind: Option<String>) -> Result<()> {
    info!("Starting htmdec-ingest");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(MemoryStore::new());
    let user = User::new(config.service_user.clone());
    let collection = store
        .create_collection(&config.service_user, &user)
        .context("Failed to create root collection")?;
    info!(collection = %collection.id, "Root collection created");

    let event_bus = EventBus::new(config.event_capacity);
    let state = AppState::new(store, event_bus, user)
        .with_default_exclude(config.default_file_exclude_regex.clone());
    let app = htmdec_ingest::build_router(state);

    let addr = bind.unwrap_or(config.bind_address);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

fn import_once(
    config: &TomlConfig,
    data_type: String,
    exclude: Option<String>,
    path: PathBuf,
) -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let user = User::new(config.service_user.clone());
    let collection = store.create_collection(&config.service_user, &user)?;
    let destination = store.get_or_create_folder(
        &ParentRef {
            id: collection.id,
            parent_type: ParentType::Collection,
        },
        "import",
        &user,
    )?;

    let adapter = FilesystemAdapter::new(store.clone());
    let events = EventBus::new(config.event_capacity);
    let env = ImportEnv {
        store: store.as_ref(),
        adapter: &adapter,
        user: &user,
        events: &events,
        default_exclude: config.default_file_exclude_regex.as_deref(),
    };

    let request = ImportRequest {
        data_type,
        destination_id: destination.id,
        destination_type: ParentType::Folder.to_string(),
        import_path: path,
        progress: false,
        params: RawImportParams {
            file_exclude_regex: exclude,
            ..Default::default()
        },
    };

    let summary = run_import(&env, request)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
