//! Web dashboard for searching patent records.
//!
//! Provides:
//! - A passcode login that opens a cookie session
//! - Column and all-field search over the loaded dataset
//! - Spreadsheet and CSV downloads of the current results
//! - Dataset reload and, with the `browser` feature, the portal version probe

mod error;
mod handlers;
mod routes;
mod templates;

pub use error::AppError;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;

use crate::auth::Gatekeeper;
use crate::config::{Settings, PASSCODE_ENV};
use crate::repository::RecordStore;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub gate: Arc<Gatekeeper>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Load the dataset and set up the passcode gate.
    ///
    /// Fails when no passcode is configured.
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let passcode = settings
            .passcode()
            .with_context(|| format!("no passcode configured; set {}", PASSCODE_ENV))?;
        let store = RecordStore::open(&settings.data_file).await;

        Ok(Self {
            store: Arc::new(store),
            gate: Arc::new(Gatekeeper::new(passcode)),
            settings: Arc::new(settings.clone()),
        })
    }

    pub fn has_logo(&self) -> bool {
        self.settings.logo_file.is_file()
    }

    pub fn scrape_enabled(&self) -> bool {
        cfg!(feature = "browser") && self.settings.scraper.portal_url.is_some()
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
