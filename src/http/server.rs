//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, request timeout)
//! - Serve until shutdown is triggered

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::blockchain::NodeHealth;
use crate::config::schema::ListenerConfig;
use crate::contract::{PersonRegistry, PersonSubmitter};
use crate::http::handlers;
use crate::lifecycle::Shutdown;
use crate::resolver::TransactionResolver;
use crate::store::{EventStore, TransactionStore};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: TransactionResolver,
    pub transactions: Arc<dyn TransactionStore>,
    pub events: Arc<dyn EventStore>,
    pub registry: Arc<dyn PersonRegistry>,
    pub submitter: PersonSubmitter,
    pub node: Arc<dyn NodeHealth>,
    pub ingest_running: Arc<AtomicBool>,
}

/// HTTP server for the fetcher API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given state.
    pub fn new(state: AppState, config: &ListenerConfig) -> Self {
        let router = build_router(state, Duration::from_secs(config.request_timeout_secs));
        Self { router }
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.triggered().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/lime/eth", get(handlers::get_eth))
        .route("/lime/eth/{rlphex}", get(handlers::get_eth_rlp))
        .route("/lime/all", get(handlers::get_all))
        .route("/lime/savePerson", post(handlers::save_person))
        .route("/lime/listPersons", get(handlers::list_persons))
        .route("/lime/persons/count", get(handlers::persons_count))
        .route("/lime/persons/{index}", get(handlers::person_by_index))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
