//! Process configuration loaded from environment variables.

use crate::env::{self, vars};
use crate::error::{ConfigError, Result};
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;

/// Default assistant id looked up on the remote side.
pub const DEFAULT_ASSISTANT_ID: &str = "asst_v3GzI9KkkvrJTXWNn0w7Zfya";

/// Default model used when the assistant has to be created.
pub const DEFAULT_MODEL: &str = "gpt-4-1106-preview";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the remote assistant service.
    pub api_key: SecretString,

    /// Assistant identifier to look up or create.
    pub assistant_id: String,

    /// Model name used when creating the assistant.
    pub model: String,

    /// Bind address for the server.
    pub bind: String,

    /// Server port.
    pub port: u16,

    /// Folder scanned for documents to index.
    pub docs_dir: PathBuf,

    /// Directory uploaded files are persisted to (created on demand).
    pub uploads_dir: PathBuf,

    /// Directory served as the static file fallback.
    pub static_dir: PathBuf,

    /// Path to the assistant instructions file.
    pub assistant_prompt: PathBuf,

    /// Path to the per-run additional instructions file.
    pub thread_prompt: PathBuf,

    /// Run status poll interval.
    pub poll_interval: Duration,

    /// Maximum time to wait for a run to finish.
    pub poll_max_wait: Duration,

    /// Delay between streamed chunks.
    pub stream_delay: Duration,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// The API key is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let api_key = env::get_var(vars::OPENAI_API_KEY).ok_or(ConfigError::MissingApiKey)?;

        let port = match env::get_var(vars::PORT) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: vars::PORT.to_string(),
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_key: SecretString::new(api_key),
            assistant_id: env::get_var_or(vars::ASSISTANT_ID, DEFAULT_ASSISTANT_ID),
            model: env::get_var_or(vars::MODEL, DEFAULT_MODEL),
            bind: env::get_var_or(vars::BIND, "127.0.0.1"),
            port,
            docs_dir: env::get_var_or(vars::DOCS_DIR, "files").into(),
            uploads_dir: env::get_var_or(vars::UPLOADS_DIR, "uploads").into(),
            static_dir: env::get_var_or(vars::STATIC_DIR, "static").into(),
            assistant_prompt: env::get_var_or(
                vars::ASSISTANT_PROMPT,
                "prompts/assistant_prompt.txt",
            )
            .into(),
            thread_prompt: env::get_var_or(vars::THREAD_PROMPT, "prompts/thread_prompt.txt")
                .into(),
            poll_interval: millis_var(vars::POLL_INTERVAL_MS, 1_000),
            poll_max_wait: millis_var(vars::POLL_MAX_WAIT_MS, 120_000),
            stream_delay: millis_var(vars::STREAM_DELAY_MS, 50),
        })
    }

    /// Socket address string the server binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn millis_var(name: &str, default: u64) -> Duration {
    Duration::from_millis(env::get_u64(name).unwrap_or(default))
}
