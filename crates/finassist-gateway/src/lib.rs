//! HTTP/WebSocket surface for Finassist.
//!
//! Serves three things: a WebSocket endpoint that streams assistant
//! replies chunk-by-chunk, two REST endpoints (send a message, upload a
//! document for indexing), and a static file fallback for the browser UI.

mod connection;

pub mod error;
pub mod frame;
pub mod http;
pub mod registry;
pub mod server;
pub mod session;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{GatewayError, Result};
pub use frame::{Frame, FrameKind};
pub use registry::{ConnectionId, ConnectionRegistry};
pub use server::{Gateway, GatewayConfig};
pub use session::{ChatSession, SessionManager};
