//! Remote assistant API client for Finassist.
//!
//! This crate wraps the hosted assistant service: assistant lookup and
//! creation, conversation threads, runs polled to completion, and vector
//! stores for retrieval-augmented answers. Responses can be returned whole
//! or streamed chunk-by-chunk into a sink (see [`pacing`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use finassist_providers::{AssistantBackend, OpenAIAssistants};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = OpenAIAssistants::new("your-api-key")?;
//!
//!     let assistant = backend.create_or_get_assistant("asst_abc123").await?;
//!     let thread = backend.create_thread().await?;
//!     let reply = backend
//!         .send_message(&thread.id, &assistant.id, "What is my runway?")
//!         .await?;
//!     println!("{reply}");
//!
//!     Ok(())
//! }
//! ```

mod error;
mod types;

pub mod openai;
pub mod pacing;

pub use error::{ProviderError, Result};
pub use openai::OpenAIAssistants;
pub use pacing::StreamPacing;
pub use types::*;

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// The remote assistant service, as this process sees it.
///
/// Implementations own transport and credentials; callers hold only remote
/// ids. All operations surface remote failures as [`ProviderError`] and
/// never retry on their own.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Look up an assistant by id, creating it when absent.
    ///
    /// Idempotent against an unchanged remote list: the same id resolves
    /// to the same assistant on every call.
    async fn create_or_get_assistant(&self, assistant_id: &str) -> Result<Assistant>;

    /// Create a vector store from local files and wait for indexing.
    ///
    /// The store expires one day after it was last active. Returns the
    /// store id.
    async fn create_vector_store(&self, name: &str, files: &[PathBuf]) -> Result<String>;

    /// Point the assistant's file search tool at a vector store.
    async fn attach_vector_store(&self, assistant_id: &str, store_id: &str) -> Result<Assistant>;

    /// Create a new empty conversation thread.
    async fn create_thread(&self) -> Result<Thread>;

    /// Append a user message, run the assistant, and return its reply.
    ///
    /// Blocks (polling) until the run reaches a terminal status. A run
    /// that completes without an assistant text message yields
    /// [`ProviderError::NoResponse`].
    async fn send_message(
        &self,
        thread_id: &str,
        assistant_id: &str,
        text: &str,
    ) -> Result<String>;

    /// Append a user message, run the assistant, and stream its reply
    /// into `sink` chunk by chunk.
    ///
    /// Chunks arrive in order. A failed run yields exactly one error and
    /// no chunks. The terminal marker is the caller's concern; the sink
    /// only ever carries content.
    async fn stream_message(
        &self,
        thread_id: &str,
        assistant_id: &str,
        text: &str,
        sink: mpsc::Sender<String>,
    ) -> Result<()>;
}
