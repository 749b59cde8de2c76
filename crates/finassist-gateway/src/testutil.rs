//! Test doubles shared across this crate's unit tests.

use async_trait::async_trait;
use finassist_providers::{
    Assistant, AssistantBackend, ProviderError, Result, Thread,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// In-memory stand-in for the remote assistant service.
pub(crate) struct MockBackend {
    /// Reply returned by `send_message` and streamed by `stream_message`.
    pub reply: String,

    /// When set, `stream_message` fails with this run error detail.
    pub fail_stream: Option<String>,

    /// When set, `create_vector_store` fails with a 500.
    pub fail_store: bool,

    pub assistant_calls: AtomicUsize,
    pub thread_calls: AtomicUsize,
    pub store_calls: AtomicUsize,
    pub attach_calls: AtomicUsize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            reply: "Hi there".to_string(),
            fail_stream: None,
            fail_store: false,
            assistant_calls: AtomicUsize::new(0),
            thread_calls: AtomicUsize::new(0),
            store_calls: AtomicUsize::new(0),
            attach_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AssistantBackend for MockBackend {
    async fn create_or_get_assistant(&self, assistant_id: &str) -> Result<Assistant> {
        self.assistant_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Assistant {
            id: assistant_id.to_string(),
            name: Some("Financial Assistant".to_string()),
            model: "gpt-4-1106-preview".to_string(),
        })
    }

    async fn create_vector_store(&self, _name: &str, _files: &[PathBuf]) -> Result<String> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_store {
            return Err(ProviderError::api(500, "store creation failed"));
        }
        Ok("vs_mock".to_string())
    }

    async fn attach_vector_store(&self, assistant_id: &str, _store_id: &str) -> Result<Assistant> {
        self.attach_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Assistant {
            id: assistant_id.to_string(),
            name: Some("Financial Assistant".to_string()),
            model: "gpt-4-1106-preview".to_string(),
        })
    }

    async fn create_thread(&self) -> Result<Thread> {
        let n = self.thread_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Thread {
            id: format!("thread_{}", n),
        })
    }

    async fn send_message(
        &self,
        _thread_id: &str,
        _assistant_id: &str,
        _text: &str,
    ) -> Result<String> {
        Ok(self.reply.clone())
    }

    async fn stream_message(
        &self,
        _thread_id: &str,
        _assistant_id: &str,
        _text: &str,
        sink: mpsc::Sender<String>,
    ) -> Result<()> {
        if let Some(detail) = &self.fail_stream {
            return Err(ProviderError::run_failed(detail.clone()));
        }
        for ch in self.reply.chars() {
            if sink.send(ch.to_string()).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}
