//! Per-connection WebSocket handling.
//!
//! Each accepted socket gets three tasks: the read loop (this module's
//! entry point), a writer draining the connection's outbound frame queue,
//! and a worker that processes inbound chat messages strictly one at a
//! time. Queuing messages through the worker means chunks from two turns
//! can never interleave on one connection. Worker and writer are aborted
//! when the read loop exits, so a hung remote run dies with its
//! connection.

use crate::frame::Frame;
use crate::server::AppState;
use crate::session::ChatSession;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Capacity of the outbound frame queue per connection.
const OUTBOUND_QUEUE: usize = 64;

/// Capacity of the inbound message queue per connection. Messages beyond
/// this wait in the socket buffer; the worker handles one at a time.
const INBOUND_QUEUE: usize = 16;

/// Welcome frame content sent on upgrade.
const WELCOME: &str = "Connected to Financial Assistant";

/// Drive one accepted WebSocket connection until it closes.
pub(crate) async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    let (outbound_tx, outbound_rx) = mpsc::channel::<Frame>(OUTBOUND_QUEUE);

    state.registry.add(connection_id, outbound_tx.clone()).await;
    info!("client connected: {}", connection_id);

    let (ws_tx, ws_rx) = socket.split();
    let writer = tokio::spawn(write_loop(ws_tx, outbound_rx));

    let _ = outbound_tx.send(Frame::system(WELCOME)).await;

    let (queue_tx, queue_rx) = mpsc::channel::<String>(INBOUND_QUEUE);
    let worker = tokio::spawn(run_worker(state.clone(), queue_rx, outbound_tx.clone()));

    read_loop(ws_rx, queue_tx, outbound_tx).await;

    // Read side is done: tear everything down and deregister.
    worker.abort();
    writer.abort();
    state.registry.remove(connection_id).await;
    info!("client disconnected: {}", connection_id);
}

/// Read inbound frames, queueing chat content for the worker.
async fn read_loop(
    mut ws_rx: SplitStream<WebSocket>,
    queue_tx: mpsc::Sender<String>,
    outbound_tx: mpsc::Sender<Frame>,
) {
    while let Some(message) = ws_rx.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<Frame>(&text) {
                Ok(frame) => {
                    debug!("received message from client: {}", frame.content);
                    if queue_tx.send(frame.content).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("malformed client frame: {}", e);
                    let _ = outbound_tx.send(Frame::error("Malformed message")).await;
                }
            },
            Ok(Message::Close(_)) => {
                debug!("client closed connection");
                break;
            }
            Err(e) => {
                warn!("websocket read error: {}", e);
                break;
            }
            _ => {}
        }
    }
}

/// Drain the outbound queue into the socket.
async fn write_loop(mut ws_tx: SplitSink<WebSocket, Message>, mut rx: mpsc::Receiver<Frame>) {
    while let Some(frame) = rx.recv().await {
        let text = match serde_json::to_string(&frame) {
            Ok(text) => text,
            Err(e) => {
                error!("failed to encode frame: {}", e);
                continue;
            }
        };
        if ws_tx.send(Message::Text(text)).await.is_err() {
            break;
        }
    }
}

/// Process queued chat messages sequentially, one stream at a time.
async fn run_worker(
    state: Arc<AppState>,
    mut queue: mpsc::Receiver<String>,
    outbound: mpsc::Sender<Frame>,
) {
    let mut session: Option<ChatSession> = None;

    while let Some(text) = queue.recv().await {
        let current = match &session {
            Some(current) => current.clone(),
            None => match state.sessions.open_session().await {
                Ok(opened) => {
                    session = Some(opened.clone());
                    opened
                }
                Err(e) => {
                    error!("failed to open chat session: {}", e);
                    let _ = outbound.send(Frame::error("Error processing message")).await;
                    let _ = outbound.send(Frame::ai_end()).await;
                    continue;
                }
            },
        };

        stream_turn(&state, &current, &text, &outbound).await;
    }
}

/// Run one chat turn: stream the reply as `ai` chunks, then emit exactly
/// one terminal frame. A streaming error produces one error frame; the
/// terminal frame still ends the turn.
pub(crate) async fn stream_turn(
    state: &AppState,
    session: &ChatSession,
    text: &str,
    outbound: &mpsc::Sender<Frame>,
) {
    let (sink_tx, mut sink_rx) = mpsc::channel::<String>(1);
    let (done_tx, mut done_rx) = oneshot::channel::<()>();

    let backend = state.sessions.backend().clone();
    let thread_id = session.thread_id.clone();
    let assistant_id = session.assistant_id.clone();
    let message = text.to_string();
    let error_tx = outbound.clone();

    tokio::spawn(async move {
        if let Err(e) = backend
            .stream_message(&thread_id, &assistant_id, &message, sink_tx)
            .await
        {
            error!("error streaming message: {}", e);
            let _ = error_tx.send(Frame::error("Error processing message")).await;
        }
        let _ = done_tx.send(());
    });

    loop {
        tokio::select! {
            chunk = sink_rx.recv() => {
                match chunk {
                    Some(chunk) => {
                        if outbound.send(Frame::ai_chunk(chunk)).await.is_err() {
                            return;
                        }
                    }
                    // Sink closed: the streaming call finished.
                    None => break,
                }
            }
            _ = &mut done_rx => {
                // Drain chunks that raced the done signal, then finish.
                while let Ok(chunk) = sink_rx.try_recv() {
                    if outbound.send(Frame::ai_chunk(chunk)).await.is_err() {
                        return;
                    }
                }
                break;
            }
        }
    }

    let _ = outbound.send(Frame::ai_end()).await;
}
