//! Shared test support for the integration suite.
//!
//! Provides an in-memory assistant backend and a helper that serves a
//! gateway on an ephemeral port.

use async_trait::async_trait;
use finassist_gateway::server::AppState;
use finassist_gateway::{Gateway, GatewayConfig};
use finassist_providers::{
    Assistant, AssistantBackend, ProviderError, Result, Thread,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// In-memory stand-in for the remote assistant service.
pub struct MockBackend {
    /// Reply returned by `send_message` and streamed by `stream_message`.
    pub reply: String,

    /// When set, `create_vector_store` fails with a 500.
    pub fail_store: bool,

    pub thread_calls: AtomicUsize,
    pub attach_calls: AtomicUsize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            reply: "Hi there".to_string(),
            fail_store: false,
            thread_calls: AtomicUsize::new(0),
            attach_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AssistantBackend for MockBackend {
    async fn create_or_get_assistant(&self, assistant_id: &str) -> Result<Assistant> {
        Ok(Assistant {
            id: assistant_id.to_string(),
            name: Some("Financial Assistant".to_string()),
            model: "gpt-4-1106-preview".to_string(),
        })
    }

    async fn create_vector_store(&self, _name: &str, _files: &[PathBuf]) -> Result<String> {
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
        for ch in self.reply.chars() {
            if sink.send(ch.to_string()).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Serve a gateway over `backend` on an ephemeral local port.
///
/// Returns the bound address and the shared server state.
pub async fn spawn_gateway(
    backend: Arc<dyn AssistantBackend>,
    config: GatewayConfig,
) -> (SocketAddr, Arc<AppState>) {
    let gateway = Gateway::new(config, backend);
    let state = gateway.state().clone();
    let router = gateway.router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });

    (addr, state)
}
