//! The axum server: routes, state, and the serve loop.

use crate::connection;
use crate::error::{GatewayError, Result};
use crate::http;
use crate::registry::ConnectionRegistry;
use crate::session::SessionManager;
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use finassist_providers::AssistantBackend;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address the server listens on.
    pub listen_addr: String,

    /// Directory served as the fallback for unmatched routes.
    pub static_dir: PathBuf,

    /// Directory uploaded files are persisted to.
    pub uploads_dir: PathBuf,

    /// Assistant id resolved for every session.
    pub assistant_id: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            static_dir: PathBuf::from("static"),
            uploads_dir: PathBuf::from("uploads"),
            assistant_id: finassist_core::config::DEFAULT_ASSISTANT_ID.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Derive the gateway configuration from the process configuration.
    pub fn from_config(config: &finassist_core::Config) -> Self {
        Self {
            listen_addr: config.listen_addr(),
            static_dir: config.static_dir.clone(),
            uploads_dir: config.uploads_dir.clone(),
            assistant_id: config.assistant_id.clone(),
        }
    }
}

/// Shared server state.
pub struct AppState {
    /// Open WebSocket connections.
    pub registry: ConnectionRegistry,

    /// Session creation and the cached assistant.
    pub sessions: SessionManager,

    /// Where uploads are persisted.
    pub uploads_dir: PathBuf,
}

impl AppState {
    pub(crate) fn new(config: GatewayConfig, backend: Arc<dyn AssistantBackend>) -> Arc<Self> {
        Arc::new(Self {
            registry: ConnectionRegistry::new(),
            sessions: SessionManager::new(backend, config.assistant_id),
            uploads_dir: config.uploads_dir,
        })
    }
}

/// The HTTP/WebSocket gateway server.
pub struct Gateway {
    state: Arc<AppState>,
    config: GatewayConfig,
}

impl Gateway {
    /// Create a new gateway over a backend.
    pub fn new(config: GatewayConfig, backend: Arc<dyn AssistantBackend>) -> Self {
        let state = AppState::new(config.clone(), backend);
        Self { state, config }
    }

    /// Shared state, mainly for tests and embedding.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Get connected client count.
    pub async fn client_count(&self) -> usize {
        self.state.registry.len().await
    }

    /// Create the axum router, for serving or embedding in tests.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/send", post(http::send_message))
            .route("/api/upload", post(http::upload_file))
            .route("/ws", get(ws_handler))
            .route("/health", get(http::health))
            .with_state(self.state.clone())
            .fallback_service(ServeDir::new(&self.config.static_dir))
            .layer(CorsLayer::permissive())
    }

    /// Run the server until it fails or is shut down externally.
    pub async fn run(&self) -> Result<()> {
        let app = self.router();

        info!("Starting server on {}", self.config.listen_addr);
        let listener = tokio::net::TcpListener::bind(&self.config.listen_addr)
            .await
            .map_err(GatewayError::Io)?;

        axum::serve(listener, app).await.map_err(GatewayError::Io)?;
        Ok(())
    }
}

/// WebSocket upgrade handler.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection::handle_socket(socket, state))
}
