//! HTTP server for the mdsite documentation engine.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - Document endpoint: rendered HTML plus metadata as JSON
//! - Manifest endpoint: navigation tree and search index
//! - Asset endpoint: raw files from the content root with ETag support
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use mdsite_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_string(),
//!         port: 7878,
//!         source_dir: PathBuf::from("docs"),
//!         cache_dir: Some(PathBuf::from(".mdsite/cache")),
//!         frozen: false,
//!         embed_root_relative: true,
//!         verbose: false,
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► Rust axum server (mdsite-server)
//!                        │
//!                        ├─► /api/docs ──────► SnapshotCache (render + lookup)
//!                        ├─► /api/manifest ──► SnapshotCache (tree + search)
//!                        └─► /api/assets ────► content root (raw files)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use mdsite_content::{
    BuildOptions, CacheMode, FileSnapshotStore, NullSnapshotStore, SnapshotCache, SnapshotStore,
};
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Markdown source directory.
    pub source_dir: PathBuf,
    /// Snapshot persistence directory (`None` disables persistence).
    pub cache_dir: Option<PathBuf>,
    /// Serve the first snapshot without revalidating the content root.
    pub frozen: bool,
    /// Rewrite Obsidian embeds to root-relative targets.
    pub embed_root_relative: bool,
    /// Enable verbose output.
    pub verbose: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            source_dir: PathBuf::from("docs"),
            cache_dir: None,
            frozen: false,
            embed_root_relative: true,
            verbose: false,
        }
    }
}

/// Run the server.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let cache = Arc::new(snapshot_cache_from(&config));

    let state = Arc::new(AppState {
        cache,
        content_root: config.source_dir.clone(),
        verbose: config.verbose,
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the snapshot cache described by the configuration.
#[must_use]
pub fn snapshot_cache_from(config: &ServerConfig) -> SnapshotCache {
    let store: Box<dyn SnapshotStore> = match &config.cache_dir {
        Some(dir) => Box::new(FileSnapshotStore::new(dir.clone())),
        None => Box::new(NullSnapshotStore),
    };
    let mode = if config.frozen {
        CacheMode::Frozen
    } else {
        CacheMode::Live
    };
    SnapshotCache::new(
        config.source_dir.clone(),
        BuildOptions {
            embed_root_relative: config.embed_root_relative,
        },
        mode,
        store,
    )
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from mdsite config.
#[must_use]
pub fn server_config_from_config(config: &mdsite_config::Config, verbose: bool) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        source_dir: config.content_resolved.source_dir.clone(),
        cache_dir: if config.cache_resolved.enabled {
            Some(config.cache_resolved.dir.clone())
        } else {
            None
        },
        frozen: config.cache_resolved.frozen,
        embed_root_relative: config.content_resolved.embed_root_relative,
        verbose,
    }
}
