//! Sink-side chunking of assistant responses.
//!
//! The remote API returns the full response text once the run completes;
//! how that text reaches the client is a presentation choice. The pacing
//! strategy is applied at the stream sink, independent of the remote call.

use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// How a completed response is chunked into a stream sink.
#[derive(Debug, Clone)]
pub enum StreamPacing {
    /// One character per chunk, with a fixed delay between chunks.
    /// Reproduces a typing effect.
    PerCharacter { delay: Duration },

    /// The whole text as a single chunk.
    Whole,
}

impl Default for StreamPacing {
    fn default() -> Self {
        Self::PerCharacter {
            delay: Duration::from_millis(50),
        }
    }
}

impl StreamPacing {
    /// Emit `text` into `sink` according to this strategy.
    ///
    /// Chunks are emitted in order. A closed sink stops emission early
    /// without error: the receiver going away means the client is gone.
    pub async fn emit(&self, text: &str, sink: &mpsc::Sender<String>) {
        match self {
            Self::PerCharacter { delay } => {
                for ch in text.chars() {
                    if sink.send(ch.to_string()).await.is_err() {
                        debug!("stream sink closed, stopping emission");
                        return;
                    }
                    tokio::time::sleep(*delay).await;
                }
            }
            Self::Whole => {
                if !text.is_empty() && sink.send(text.to_string()).await.is_err() {
                    debug!("stream sink closed, stopping emission");
                }
            }
        }
    }
}
