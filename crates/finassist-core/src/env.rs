//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
pub fn get_var_or(name: &str, default: &str) -> String {
    get_var(name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable as a u16 (e.g., for ports).
pub fn get_u16(name: &str) -> Option<u16> {
    get_var(name).and_then(|v| v.parse().ok())
}

/// Get an environment variable as a u64 (e.g., for millisecond intervals).
pub fn get_u64(name: &str) -> Option<u64> {
    get_var(name).and_then(|v| v.parse().ok())
}

/// Load environment variables from a .env file.
pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = std::path::Path::new(".env");
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Parse KEY=value
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();

                // Remove quotes if present
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                    .unwrap_or(value);

                // Only set if not already set
                if env::var(key).is_err() {
                    env::set_var(key, value);
                }
            }
        }
    }
    Ok(())
}

/// Common environment variable names.
pub mod vars {
    /// API key for the remote assistant service.
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

    /// Assistant identifier to look up or create.
    pub const ASSISTANT_ID: &str = "FINASSIST_ASSISTANT_ID";

    /// Model name used when creating the assistant.
    pub const MODEL: &str = "FINASSIST_MODEL";

    /// Bind address for the server.
    pub const BIND: &str = "FINASSIST_BIND";

    /// Port for the server.
    pub const PORT: &str = "FINASSIST_PORT";

    /// Folder scanned for documents to index.
    pub const DOCS_DIR: &str = "FINASSIST_DOCS_DIR";

    /// Directory uploaded files are persisted to.
    pub const UPLOADS_DIR: &str = "FINASSIST_UPLOADS_DIR";

    /// Directory served as the static file fallback.
    pub const STATIC_DIR: &str = "FINASSIST_STATIC_DIR";

    /// Path to the assistant instructions file.
    pub const ASSISTANT_PROMPT: &str = "FINASSIST_ASSISTANT_PROMPT";

    /// Path to the per-run additional instructions file.
    pub const THREAD_PROMPT: &str = "FINASSIST_THREAD_PROMPT";

    /// Run status poll interval in milliseconds.
    pub const POLL_INTERVAL_MS: &str = "FINASSIST_POLL_INTERVAL_MS";

    /// Maximum time to wait for a run in milliseconds.
    pub const POLL_MAX_WAIT_MS: &str = "FINASSIST_POLL_MAX_WAIT_MS";

    /// Delay between streamed chunks in milliseconds.
    pub const STREAM_DELAY_MS: &str = "FINASSIST_STREAM_DELAY_MS";
}
