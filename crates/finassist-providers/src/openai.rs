//! OpenAI Assistants API implementation.
//!
//! Talks to the Assistants v2 endpoints: assistants, threads, messages,
//! runs, files, and vector stores. Runs are polled to a terminal status
//! at a configurable interval; the service exposes no push primitive at
//! this layer.

use crate::pacing::StreamPacing;
use crate::types::{Assistant, Run, RunPollConfig, RunStatus, Thread};
use crate::{AssistantBackend, ProviderError, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default API base URL.
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Beta header required by the Assistants v2 endpoints.
const ASSISTANTS_BETA: &str = "assistants=v2";

/// Name given to assistants this process creates.
const DEFAULT_ASSISTANT_NAME: &str = "Financial Assistant";

/// Days of inactivity after which a vector store expires.
const VECTOR_STORE_EXPIRY_DAYS: u32 = 1;

/// Client for the OpenAI Assistants API.
pub struct OpenAIAssistants {
    /// HTTP client.
    client: Client,

    /// API key.
    api_key: SecretString,

    /// API base URL.
    api_base: String,

    /// Model used when the assistant has to be created.
    model: String,

    /// Name given to a newly created assistant.
    assistant_name: String,

    /// Instructions file for assistant creation.
    assistant_prompt: PathBuf,

    /// Additional-instructions file attached to each blocking run.
    thread_prompt: PathBuf,

    /// Run/batch polling configuration.
    poll: RunPollConfig,

    /// How streamed responses are chunked into the sink.
    pacing: StreamPacing,
}

impl OpenAIAssistants {
    /// Create a new client with an API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ProviderError::config("API key is required"));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(|e| ProviderError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: SecretString::new(api_key),
            api_base: DEFAULT_API_BASE.to_string(),
            model: "gpt-4-1106-preview".to_string(),
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
            assistant_prompt: PathBuf::from("prompts/assistant_prompt.txt"),
            thread_prompt: PathBuf::from("prompts/thread_prompt.txt"),
            poll: RunPollConfig::default(),
            pacing: StreamPacing::default(),
        })
    }

    /// Create a client from the process configuration.
    pub fn from_config(config: &finassist_core::Config) -> Result<Self> {
        Ok(Self::new(config.api_key.expose_secret().clone())?
            .with_model(&config.model)
            .with_prompt_files(config.assistant_prompt.clone(), config.thread_prompt.clone())
            .with_poll_config(RunPollConfig {
                interval: config.poll_interval,
                max_wait: config.poll_max_wait,
            })
            .with_pacing(StreamPacing::PerCharacter {
                delay: config.stream_delay,
            }))
    }

    /// Set the API base URL (for compatible APIs and tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Set the model used for assistant creation.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the name given to a newly created assistant.
    pub fn with_assistant_name(mut self, name: impl Into<String>) -> Self {
        self.assistant_name = name.into();
        self
    }

    /// Set the prompt file locations.
    pub fn with_prompt_files(
        mut self,
        assistant_prompt: impl Into<PathBuf>,
        thread_prompt: impl Into<PathBuf>,
    ) -> Self {
        self.assistant_prompt = assistant_prompt.into();
        self.thread_prompt = thread_prompt.into();
        self
    }

    /// Set the polling configuration.
    pub fn with_poll_config(mut self, poll: RunPollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Set the stream pacing strategy.
    pub fn with_pacing(mut self, pacing: StreamPacing) -> Self {
        self.pacing = pacing;
        self
    }

    fn auth_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {}", self.api_key.expose_secret())
                .parse()
                .unwrap(),
        );
        headers.insert("OpenAI-Beta", ASSISTANTS_BETA.parse().unwrap());
        headers
    }

    /// Map a non-success response into a provider error.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ApiErrorBody>()
            .await
            .map(|b| b.error.message)
            .unwrap_or_else(|_| "Unknown error".to_string());

        match status.as_u16() {
            401 => Err(ProviderError::auth(message)),
            code => Err(ProviderError::api(code, message)),
        }
    }

    async fn read_prompt(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ProviderError::file_io(path, e))
    }

    async fn append_user_message(&self, thread_id: &str, text: &str) -> Result<()> {
        let request = MessageCreateRequest {
            role: "user",
            content: vec![ContentPartParam {
                part_type: "text",
                text: text.to_string(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/threads/{}/messages", self.api_base, thread_id))
            .headers(self.auth_headers())
            .json(&request)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
        additional_instructions: Option<String>,
    ) -> Result<Run> {
        let request = RunCreateRequest {
            assistant_id: assistant_id.to_string(),
            additional_instructions,
        };

        let response = self
            .client
            .post(format!("{}/threads/{}/runs", self.api_base, thread_id))
            .headers(self.auth_headers())
            .json(&request)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Poll a run at the configured interval until it reaches a terminal
    /// status, bounded by the configured maximum wait.
    async fn poll_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let deadline = tokio::time::Instant::now() + self.poll.max_wait;

        loop {
            let response = self
                .client
                .get(format!(
                    "{}/threads/{}/runs/{}",
                    self.api_base, thread_id, run_id
                ))
                .headers(self.auth_headers())
                .send()
                .await?;

            let run: Run = Self::check(response).await?.json().await?;
            if run.status.is_terminal() {
                return Ok(run);
            }

            debug!("run {} still {:?}", run_id, run.status);
            if tokio::time::Instant::now() >= deadline {
                return Err(ProviderError::Timeout(self.poll.max_wait.as_millis() as u64));
            }
            tokio::time::sleep(self.poll.interval).await;
        }
    }

    fn ensure_completed(run: Run) -> Result<()> {
        match run.status {
            RunStatus::Completed => Ok(()),
            RunStatus::Failed => Err(ProviderError::run_failed(
                run.last_error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "unknown error".to_string()),
            )),
            status => Err(ProviderError::run_failed(format!(
                "run ended with status {:?}",
                status
            ))),
        }
    }

    async fn list_messages(&self, thread_id: &str, limit: Option<u32>) -> Result<MessageList> {
        let mut request = self
            .client
            .get(format!("{}/threads/{}/messages", self.api_base, thread_id))
            .headers(self.auth_headers())
            .query(&[("order", "desc")]);

        if let Some(limit) = limit {
            request = request.query(&[("limit", limit.to_string())]);
        }

        let response = request.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Upload one local file with the `assistants` purpose.
    async fn upload_file(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ProviderError::file_io(path, e))?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let form = reqwest::multipart::Form::new()
            .text("purpose", "assistants")
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(format!("{}/files", self.api_base))
            .headers(self.auth_headers())
            .multipart(form)
            .send()
            .await?;

        let file: FileObject = Self::check(response).await?.json().await?;
        Ok(file.id)
    }

    /// Poll a file batch until indexing leaves `in_progress`.
    async fn poll_file_batch(&self, store_id: &str, batch_id: &str) -> Result<String> {
        let deadline = tokio::time::Instant::now() + self.poll.max_wait;

        loop {
            let response = self
                .client
                .get(format!(
                    "{}/vector_stores/{}/file_batches/{}",
                    self.api_base, store_id, batch_id
                ))
                .headers(self.auth_headers())
                .send()
                .await?;

            let batch: FileBatch = Self::check(response).await?.json().await?;
            if batch.status != "in_progress" && batch.status != "queued" {
                return Ok(batch.status);
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(ProviderError::Timeout(self.poll.max_wait.as_millis() as u64));
            }
            tokio::time::sleep(self.poll.interval).await;
        }
    }
}

#[async_trait]
impl AssistantBackend for OpenAIAssistants {
    async fn create_or_get_assistant(&self, assistant_id: &str) -> Result<Assistant> {
        let response = self
            .client
            .get(format!("{}/assistants", self.api_base))
            .headers(self.auth_headers())
            .query(&[("order", "desc"), ("limit", "100")])
            .send()
            .await?;

        let list: AssistantList = Self::check(response).await?.json().await?;
        if let Some(assistant) = list.data.into_iter().find(|a| a.id == assistant_id) {
            info!("Found existing assistant: {}", assistant.id);
            return Ok(assistant);
        }

        let instructions = self.read_prompt(&self.assistant_prompt).await?;
        let request = AssistantCreateRequest {
            name: self.assistant_name.clone(),
            instructions,
            tools: vec![ToolParam {
                tool_type: "file_search",
            }],
            model: self.model.clone(),
        };

        let response = self
            .client
            .post(format!("{}/assistants", self.api_base))
            .headers(self.auth_headers())
            .json(&request)
            .send()
            .await?;

        let assistant: Assistant = Self::check(response).await?.json().await?;
        info!("Created new assistant: {}", assistant.id);
        Ok(assistant)
    }

    async fn create_vector_store(&self, name: &str, files: &[PathBuf]) -> Result<String> {
        let request = VectorStoreCreateRequest {
            name: name.to_string(),
            expires_after: ExpiresAfter {
                anchor: "last_active_at",
                days: VECTOR_STORE_EXPIRY_DAYS,
            },
        };

        let response = self
            .client
            .post(format!("{}/vector_stores", self.api_base))
            .headers(self.auth_headers())
            .json(&request)
            .send()
            .await?;

        let store: VectorStore = Self::check(response).await?.json().await?;

        let mut file_ids = Vec::with_capacity(files.len());
        for path in files {
            file_ids.push(self.upload_file(path).await?);
        }

        if file_ids.is_empty() {
            warn!("vector store {} created with no files", store.id);
            return Ok(store.id);
        }

        let response = self
            .client
            .post(format!(
                "{}/vector_stores/{}/file_batches",
                self.api_base, store.id
            ))
            .headers(self.auth_headers())
            .json(&FileBatchCreateRequest { file_ids })
            .send()
            .await?;

        let batch: FileBatch = Self::check(response).await?.json().await?;
        let status = self.poll_file_batch(&store.id, &batch.id).await?;
        info!("Created vector store {} with batch status: {}", store.id, status);

        Ok(store.id)
    }

    async fn attach_vector_store(&self, assistant_id: &str, store_id: &str) -> Result<Assistant> {
        let request = AssistantUpdateRequest {
            tool_resources: ToolResources {
                file_search: FileSearchResources {
                    vector_store_ids: vec![store_id.to_string()],
                },
            },
        };

        let response = self
            .client
            .post(format!("{}/assistants/{}", self.api_base, assistant_id))
            .headers(self.auth_headers())
            .json(&request)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn create_thread(&self) -> Result<Thread> {
        let response = self
            .client
            .post(format!("{}/threads", self.api_base))
            .headers(self.auth_headers())
            .json(&serde_json::json!({}))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn send_message(
        &self,
        thread_id: &str,
        assistant_id: &str,
        text: &str,
    ) -> Result<String> {
        self.append_user_message(thread_id, text).await?;

        let instructions = self.read_prompt(&self.thread_prompt).await?;
        let run = self
            .create_run(thread_id, assistant_id, Some(instructions))
            .await?;
        let run = self.poll_run(thread_id, &run.id).await?;
        Self::ensure_completed(run)?;

        let messages = self.list_messages(thread_id, None).await?;
        messages
            .first_assistant_text()
            .ok_or(ProviderError::NoResponse)
    }

    async fn stream_message(
        &self,
        thread_id: &str,
        assistant_id: &str,
        text: &str,
        sink: mpsc::Sender<String>,
    ) -> Result<()> {
        self.append_user_message(thread_id, text).await?;

        let run = self.create_run(thread_id, assistant_id, None).await?;
        let run = self.poll_run(thread_id, &run.id).await?;
        Self::ensure_completed(run)?;

        let messages = self.list_messages(thread_id, Some(1)).await?;
        if let Some(reply) = messages.first_assistant_text() {
            self.pacing.emit(&reply, &sink).await;
        }

        Ok(())
    }
}

// Internal types for the Assistants API

#[derive(Deserialize)]
struct AssistantList {
    data: Vec<Assistant>,
}

#[derive(Serialize)]
struct AssistantCreateRequest {
    name: String,
    instructions: String,
    tools: Vec<ToolParam>,
    model: String,
}

#[derive(Serialize)]
struct ToolParam {
    #[serde(rename = "type")]
    tool_type: &'static str,
}

#[derive(Serialize)]
struct AssistantUpdateRequest {
    tool_resources: ToolResources,
}

#[derive(Serialize)]
struct ToolResources {
    file_search: FileSearchResources,
}

#[derive(Serialize)]
struct FileSearchResources {
    vector_store_ids: Vec<String>,
}

#[derive(Serialize)]
struct MessageCreateRequest {
    role: &'static str,
    content: Vec<ContentPartParam>,
}

#[derive(Serialize)]
struct ContentPartParam {
    #[serde(rename = "type")]
    part_type: &'static str,
    text: String,
}

#[derive(Serialize)]
struct RunCreateRequest {
    assistant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    additional_instructions: Option<String>,
}

#[derive(Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

impl MessageList {
    /// First text block of the newest assistant-authored message.
    fn first_assistant_text(self) -> Option<String> {
        for message in self.data {
            if message.role != "assistant" {
                continue;
            }
            for block in message.content {
                if let ContentBlock::Text { text } = block {
                    return Some(text.value);
                }
            }
        }
        None
    }
}

#[derive(Deserialize)]
struct ThreadMessage {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: TextValue },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct TextValue {
    value: String,
}

#[derive(Deserialize)]
struct FileObject {
    id: String,
}

#[derive(Serialize)]
struct VectorStoreCreateRequest {
    name: String,
    expires_after: ExpiresAfter,
}

#[derive(Serialize)]
struct ExpiresAfter {
    anchor: &'static str,
    days: u32,
}

#[derive(Deserialize)]
struct VectorStore {
    id: String,
}

#[derive(Serialize)]
struct FileBatchCreateRequest {
    file_ids: Vec<String>,
}

#[derive(Deserialize)]
struct FileBatch {
    id: String,
    status: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}
