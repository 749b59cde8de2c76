//! WebSocket chat flow integration tests.
//!
//! Runs a real gateway on an ephemeral port with an in-memory backend and
//! drives it with a WebSocket client.

use finassist_gateway::GatewayConfig;
use finassist_integration_tests::{spawn_gateway, MockBackend};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: std::net::SocketAddr) -> WsClient {
    let (ws, _) = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("websocket connect");
    ws
}

/// Next text frame, parsed, with a timeout so a hung server fails fast.
async fn next_json(ws: &mut WsClient) -> serde_json::Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("websocket error");

        if let Message::Text(text) = message {
            return serde_json::from_str(&text).expect("valid frame json");
        }
    }
}

#[tokio::test]
async fn test_welcome_then_streamed_turn() {
    let (addr, _state) =
        spawn_gateway(Arc::new(MockBackend::default()), GatewayConfig::default()).await;
    let mut ws = connect(addr).await;

    let welcome = next_json(&mut ws).await;
    assert_eq!(welcome["type"], "system");
    assert_eq!(welcome["sender"], "system");

    ws.send(Message::Text(
        r#"{"type": "user", "content": "hello", "sender": "user", "isStream": false}"#.into(),
    ))
    .await
    .unwrap();

    let mut chunks = Vec::new();
    loop {
        let frame = next_json(&mut ws).await;
        assert_eq!(frame["type"], "ai");
        if frame["isStream"] == false {
            // Exactly one terminal frame, with empty content.
            assert_eq!(frame["content"], "");
            break;
        }
        chunks.push(frame["content"].as_str().unwrap().to_string());
    }

    assert_eq!(chunks.len(), 8);
    assert_eq!(chunks.join(""), "Hi there");
}

#[tokio::test]
async fn test_two_turns_do_not_interleave() {
    let (addr, _state) =
        spawn_gateway(Arc::new(MockBackend::default()), GatewayConfig::default()).await;
    let mut ws = connect(addr).await;
    let _welcome = next_json(&mut ws).await;

    // Fire two messages back to back; the worker must finish the first
    // turn (terminal frame included) before the second starts.
    for content in ["first", "second"] {
        ws.send(Message::Text(
            serde_json::json!({"type": "user", "content": content, "sender": "user", "isStream": false})
                .to_string(),
        ))
        .await
        .unwrap();
    }

    for _ in 0..2 {
        let mut reply = String::new();
        loop {
            let frame = next_json(&mut ws).await;
            assert_eq!(frame["type"], "ai");
            if frame["isStream"] == false {
                break;
            }
            reply.push_str(frame["content"].as_str().unwrap());
        }
        assert_eq!(reply, "Hi there");
    }
}

#[tokio::test]
async fn test_registry_tracks_open_connections() {
    let (addr, state) =
        spawn_gateway(Arc::new(MockBackend::default()), GatewayConfig::default()).await;

    let mut first = connect(addr).await;
    let _ = next_json(&mut first).await;
    assert_eq!(state.registry.len().await, 1);

    let mut second = connect(addr).await;
    let _ = next_json(&mut second).await;
    assert_eq!(state.registry.len().await, 2);

    first.close(None).await.unwrap();
    drop(first);
    wait_for_clients(&state, 1).await;

    drop(second);
    wait_for_clients(&state, 0).await;
}

async fn wait_for_clients(state: &finassist_gateway::server::AppState, expected: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if state.registry.len().await == expected {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "registry never reached {} clients",
            expected
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
