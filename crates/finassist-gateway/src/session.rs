//! Chat sessions over the remote backend.
//!
//! A session bundles the resolved assistant with a dedicated remote
//! thread, so concurrent users no longer share one conversation context.
//! Each WebSocket connection opens its own session; the REST surface
//! shares a single lazily-created default session.

use finassist_providers::{Assistant, AssistantBackend, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// One conversation context: an assistant plus its thread.
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Remote assistant id.
    pub assistant_id: String,

    /// Remote thread id; all turns of this session append here.
    pub thread_id: String,
}

/// Creates sessions and caches the resolved assistant.
pub struct SessionManager {
    backend: Arc<dyn AssistantBackend>,

    /// Configured assistant id to look up or create.
    assistant_id: String,

    /// Resolved assistant, cached after the first lookup.
    assistant: RwLock<Option<Assistant>>,

    /// Shared session used by the REST endpoints.
    default_session: RwLock<Option<ChatSession>>,
}

impl SessionManager {
    /// Create a manager over a backend.
    pub fn new(backend: Arc<dyn AssistantBackend>, assistant_id: impl Into<String>) -> Self {
        Self {
            backend,
            assistant_id: assistant_id.into(),
            assistant: RwLock::new(None),
            default_session: RwLock::new(None),
        }
    }

    /// The backend this manager creates sessions on.
    pub fn backend(&self) -> &Arc<dyn AssistantBackend> {
        &self.backend
    }

    /// Resolve the configured assistant, looking it up remotely once.
    pub async fn resolve_assistant(&self) -> Result<Assistant> {
        if let Some(assistant) = self.assistant.read().await.clone() {
            return Ok(assistant);
        }

        let assistant = self
            .backend
            .create_or_get_assistant(&self.assistant_id)
            .await?;

        let mut cached = self.assistant.write().await;
        if cached.is_none() {
            *cached = Some(assistant.clone());
        }
        Ok(assistant)
    }

    /// Replace the cached assistant after a remote update.
    pub async fn cache_assistant(&self, assistant: Assistant) {
        *self.assistant.write().await = Some(assistant);
    }

    /// Open a fresh session with its own remote thread.
    pub async fn open_session(&self) -> Result<ChatSession> {
        let assistant = self.resolve_assistant().await?;
        let thread = self.backend.create_thread().await?;
        info!("opened session on thread {}", thread.id);

        Ok(ChatSession {
            assistant_id: assistant.id,
            thread_id: thread.id,
        })
    }

    /// The shared session used by the REST surface, created on first use.
    pub async fn default_session(&self) -> Result<ChatSession> {
        if let Some(session) = self.default_session.read().await.clone() {
            return Ok(session);
        }

        let session = self.open_session().await?;
        let mut cached = self.default_session.write().await;
        if let Some(existing) = cached.as_ref() {
            // A concurrent request won the race; use its session.
            return Ok(existing.clone());
        }
        *cached = Some(session.clone());
        Ok(session)
    }
}
