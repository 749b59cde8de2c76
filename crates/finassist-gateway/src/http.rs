//! REST handlers.

use crate::error::{GatewayError, Result};
use crate::server::AppState;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Body of `POST /api/send`.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    /// Message content.
    pub message: String,
}

/// Response of `POST /api/send`.
#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub status: &'static str,
    pub response: String,
}

/// Response of `POST /api/upload`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub file: String,
}

/// `POST /api/send`: one blocking chat turn on the shared session.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendRequest>,
) -> Result<Json<SendResponse>> {
    debug!("send request: {} chars", request.message.len());

    let session = state.sessions.default_session().await?;
    let response = state
        .sessions
        .backend()
        .send_message(&session.thread_id, &session.assistant_id, &request.message)
        .await?;

    Ok(Json(SendResponse {
        status: "success",
        response,
    }))
}

/// `POST /api/upload`: persist a document and index it for retrieval.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut saved: Option<(String, PathBuf)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::Multipart(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        // Base name only; clients do not choose server paths.
        let file_name = field
            .file_name()
            .map(Path::new)
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let data = field
            .bytes()
            .await
            .map_err(|e| GatewayError::Multipart(e.to_string()))?;

        tokio::fs::create_dir_all(&state.uploads_dir).await?;
        let dest = state.uploads_dir.join(&file_name);
        tokio::fs::write(&dest, &data).await?;
        info!("saved upload {} ({} bytes)", dest.display(), data.len());

        saved = Some((file_name, dest));
        break;
    }

    let (file_name, dest) =
        saved.ok_or_else(|| GatewayError::BadRequest("missing 'file' field".to_string()))?;

    index_document(&state, &dest).await?;

    Ok(Json(UploadResponse {
        status: "success",
        file: file_name,
    }))
}

/// Build a vector store from one document and point the assistant at it.
///
/// The assistant update only happens once the store exists; a store
/// failure leaves the assistant untouched.
pub(crate) async fn index_document(state: &AppState, path: &Path) -> Result<()> {
    let store_id = state
        .sessions
        .backend()
        .create_vector_store("Financial Statements", &[path.to_path_buf()])
        .await?;

    let assistant = state.sessions.resolve_assistant().await?;
    let updated = state
        .sessions
        .backend()
        .attach_vector_store(&assistant.id, &store_id)
        .await?;
    state.sessions.cache_assistant(updated).await;

    info!("attached vector store {} to assistant", store_id);
    Ok(())
}

/// `GET /health`.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "clients": state.registry.len().await,
    }))
}
