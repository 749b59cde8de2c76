//! Public types for the remote assistant backend.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A remote assistant identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistant {
    /// Remote assistant id.
    pub id: String,

    /// Display name.
    pub name: Option<String>,

    /// Model the assistant runs on.
    #[serde(default)]
    pub model: String,
}

/// A remote conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    /// Remote thread id.
    pub id: String,
}

/// A single remote execution of the assistant against a thread.
#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    /// Remote run id.
    pub id: String,

    /// Current status.
    pub status: RunStatus,

    /// Error detail, present when the run failed.
    #[serde(default)]
    pub last_error: Option<RunError>,
}

/// Run status as reported by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Completed,
    Failed,
    Cancelling,
    Cancelled,
    Expired,
    /// Any status this client does not know about; treated as in-flight.
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Whether this status ends the run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Expired
        )
    }
}

/// Remote error detail attached to a failed run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

/// Polling configuration for run and file batch status.
#[derive(Debug, Clone)]
pub struct RunPollConfig {
    /// Time between status checks.
    pub interval: Duration,

    /// Maximum total time to wait before giving up.
    pub max_wait: Duration,
}

impl Default for RunPollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(120),
        }
    }
}
