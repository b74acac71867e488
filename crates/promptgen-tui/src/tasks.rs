//! Background work requested by the session. Each request runs on its own
//! task and answers with exactly one `AppEvent`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use promptgen_core::clipboard::Clipboard;
use promptgen_core::error::ExportError;
use promptgen_core::export;
use promptgen_core::prompt::Prompt;
use promptgen_core::store::PromptStore;

use crate::app::{AppEvent, Request};

/// Shared handles the tasks work against.
#[derive(Clone)]
pub struct TaskContext {
    pub store: Arc<dyn PromptStore>,
    pub clipboard: Arc<dyn Clipboard>,
}

pub fn spawn(
    request: Request,
    ctx: &TaskContext,
    results: mpsc::UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    match request {
        Request::LoadPrompts => {
            let store = Arc::clone(&ctx.store);
            tokio::spawn(async move {
                let event = match tokio::task::spawn_blocking(move || store.load_all()).await {
                    Ok(Ok(collection)) => {
                        info!(count = collection.len(), "prompts loaded");
                        AppEvent::PromptsLoaded(collection)
                    }
                    Ok(Err(e)) => AppEvent::LoadFailed(e.to_string()),
                    Err(e) => AppEvent::LoadFailed(e.to_string()),
                };
                let _ = results.send(event);
            })
        }
        Request::SavePrompt(prompt) => {
            let store = Arc::clone(&ctx.store);
            tokio::spawn(async move {
                let title = prompt.title.clone();
                let event = match tokio::task::spawn_blocking(move || store.append(prompt)).await {
                    Ok(Ok(())) => {
                        info!(title = %title, "prompt saved");
                        AppEvent::PromptSaved
                    }
                    Ok(Err(e)) => {
                        warn!(title = %title, error = %e, "saving prompt failed");
                        AppEvent::SaveFailed(e.to_string())
                    }
                    Err(e) => AppEvent::SaveFailed(e.to_string()),
                };
                let _ = results.send(event);
            })
        }
        Request::CopyToClipboard(prompt) => {
            let clipboard = Arc::clone(&ctx.clipboard);
            tokio::spawn(async move {
                let event =
                    match tokio::task::spawn_blocking(move || copy_prompt(&prompt, &*clipboard))
                        .await
                    {
                        Ok(event) => event,
                        Err(e) => AppEvent::CopyFailed(format!("Clipboard error: {e}")),
                    };
                let _ = results.send(event);
            })
        }
        Request::ExpireStatus { id, after } => tokio::spawn(expire_status(id, after, results)),
    }
}

async fn expire_status(id: u64, after: Duration, results: mpsc::UnboundedSender<AppEvent>) {
    tokio::time::sleep(after).await;
    let _ = results.send(AppEvent::StatusExpired(id));
}

/// Export `prompt` and put the XML on the clipboard.
///
/// A missing doc file does not block the copy: the prompt markup is copied
/// alone and the failure comes back as a warning.
fn copy_prompt(prompt: &Prompt, clipboard: &dyn Clipboard) -> AppEvent {
    let (text, warning) = match export::export(prompt) {
        Ok(text) => (text, None),
        Err(e @ ExportError::Doc { .. }) => {
            warn!(error = %e, "copying prompt without its doc file");
            let partial = e.partial_output().unwrap_or_default().to_string();
            (partial, Some(e.to_string()))
        }
        Err(e) => return AppEvent::CopyFailed(e.to_string()),
    };

    match clipboard.write_text(&text) {
        Ok(()) => {
            info!(title = %prompt.title, bytes = text.len(), "prompt copied");
            AppEvent::CopyDone { warning }
        }
        Err(e) => {
            warn!(error = %e, "clipboard write failed");
            AppEvent::CopyFailed(format!("Clipboard error: {e}"))
        }
    }
}
