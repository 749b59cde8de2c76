//! The JSON envelope exchanged with clients over the WebSocket.
//!
//! Field names are part of the wire contract with the browser UI:
//! `{type, content, sender, isStream}`. A streaming chunk carries
//! `isStream: true`; the terminal marker of a turn is an `ai` frame with
//! empty content and `isStream: false`.

use serde::{Deserialize, Serialize};

/// Message origin/category tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    /// Server-originated status message.
    System,
    /// Message typed by the user.
    User,
    /// Assistant output (streamed chunk or terminal marker).
    Ai,
    /// Error surfaced to the client.
    Error,
}

/// One WebSocket frame, either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "type")]
    pub kind: FrameKind,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub sender: String,

    #[serde(rename = "isStream", default)]
    pub is_stream: bool,
}

impl Frame {
    /// A system status frame.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::System,
            content: content.into(),
            sender: "system".to_string(),
            is_stream: false,
        }
    }

    /// One streamed chunk of an assistant reply.
    pub fn ai_chunk(content: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Ai,
            content: content.into(),
            sender: "ai".to_string(),
            is_stream: true,
        }
    }

    /// The terminal marker ending a streamed turn.
    pub fn ai_end() -> Self {
        Self {
            kind: FrameKind::Ai,
            content: String::new(),
            sender: "ai".to_string(),
            is_stream: false,
        }
    }

    /// An error frame.
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Error,
            content: content.into(),
            sender: "system".to_string(),
            is_stream: false,
        }
    }
}
