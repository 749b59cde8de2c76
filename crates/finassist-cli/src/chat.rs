//! `finassist chat`: interactive console session with the assistant.

use finassist_core::Config;
use finassist_providers::{AssistantBackend, OpenAIAssistants};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Name given to the vector store built from the documents folder.
const STORE_NAME: &str = "Financial Statements";

/// Run the console chat loop.
pub async fn run(config: Config, index: bool) -> anyhow::Result<()> {
    let backend: Arc<dyn AssistantBackend> = Arc::new(OpenAIAssistants::from_config(&config)?);

    let mut assistant = backend.create_or_get_assistant(&config.assistant_id).await?;

    if index {
        let files = list_files(&config.docs_dir)?;
        info!("indexing {} files from {}", files.len(), config.docs_dir.display());
        let store_id = backend.create_vector_store(STORE_NAME, &files).await?;
        assistant = backend.attach_vector_store(&assistant.id, &store_id).await?;
    }

    let thread = backend.create_thread().await?;
    info!("ready to chat with the assistant");

    println!("Welcome to the Financial Assistant Chatbot!");
    println!("Type 'exit' to quit.");

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("\nYou: ") {
            Ok(line) => {
                if is_exit(&line) {
                    println!("Goodbye!");
                    break;
                }
                let _ = editor.add_history_entry(&line);

                match backend
                    .send_message(&thread.id, &assistant.id, &line)
                    .await
                {
                    Ok(reply) => println!("Assistant: {}", reply),
                    Err(e) => error!("Error sending message: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// The loop ends only on the exact command; anything else is forwarded
/// to the assistant unchanged.
fn is_exit(line: &str) -> bool {
    line == "exit"
}

/// Every regular file under `dir`, recursively.
fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    Ok(files)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}
