//! API Server Module
//!
//! Router construction and the listener loop for the molecule service.

use anyhow::Result;
use axum::{routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use molview_core::ServerConfig;
use molview_databases::MoleculeStore;

use crate::handlers::{
    get_molecule_details, get_molecule_xyz, health_check, index, list_molecules, molecule_chart,
    ApiState,
};

/// Build the application router over the shared state
pub fn create_router(state: Arc<ApiState>, static_dir: &Path) -> Router {
    Router::new()
        // Front-end page
        .route("/", get(index))
        // Molecule queries
        .route("/api/molecules", get(list_molecules))
        .route("/api/molecules/chart", get(molecule_chart))
        .route("/api/molecule/:id", get(get_molecule_xyz))
        .route("/api/molecule/:id/details", get(get_molecule_details))
        // Health check
        .route("/health", get(health_check))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Main API server
pub struct ApiServer {
    /// Server configuration
    config: ServerConfig,
    /// Shared state
    state: Arc<ApiState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ServerConfig) -> Self {
        let state = Arc::new(ApiState {
            store: MoleculeStore::from_config(&config.database),
            assets: config.assets.clone(),
        });

        Self { config, state }
    }

    /// Router for this server's configuration
    pub fn router(&self) -> Router {
        create_router(self.state.clone(), &self.config.assets.static_dir)
    }

    /// Start the API server and run until interrupted
    pub async fn start(&self) -> Result<()> {
        info!(
            "Starting MolView API server, store at {}",
            self.state.store.database_path().display()
        );

        // The store is opened per request; an unreachable store only degrades the API.
        if let Err(e) = self.state.store.test_connection().await {
            warn!("Molecule store check failed: {e}");
        }

        let addr = self.config.bind_address();
        let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
        info!("MolView API server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to run API server: {}", e))?;

        info!("Server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
