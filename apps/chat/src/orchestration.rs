//! Turns parsed commands into coordinator calls.

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use client_core::{ChatSession, DocumentUpload, Rejection, Settlement};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::{
    commands::{ChatCommand, HELP},
    render,
};

pub async fn load_document(path: &Path) -> Result<DocumentUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read document '{}'", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("'{}' does not name a file", path.display()))?;
    let mime_type = mime_guess::from_path(path).first_or_octet_stream();
    Ok(DocumentUpload::new(file_name, bytes).with_mime_type(mime_type.essence_str()))
}

/// Dispatches one command. Operations that reach the network are spawned onto
/// `tasks` so an upload and a question can be outstanding together.
pub async fn dispatch(
    session: &Arc<ChatSession>,
    command: ChatCommand,
    tasks: &mut JoinSet<()>,
) {
    match command {
        ChatCommand::Ask(text) => {
            if session.query_state().await.is_awaiting_answer {
                println!("  (still waiting for the previous answer)");
                return;
            }
            let session = Arc::clone(session);
            tasks.spawn(async move {
                log_outcome("query", session.submit_query(&text).await);
            });
        }
        ChatCommand::Upload(path) => {
            if session.upload_state().await.is_uploading {
                println!("  (an upload is already in progress)");
                return;
            }
            let document = match load_document(&path).await {
                Ok(document) => document,
                Err(err) => {
                    warn!(error = %err, "document not loaded");
                    println!("  ({err:#})");
                    return;
                }
            };
            let session = Arc::clone(session);
            tasks.spawn(async move {
                log_outcome("ingestion", session.submit_document(document).await);
            });
        }
        ChatCommand::Status => {
            let upload = session.upload_state().await;
            let query = session.query_state().await;
            println!("  {}", render::render_status(session.theme(), &upload, &query));
        }
        ChatCommand::History => {
            let renderer = render::TranscriptRenderer::new(session.theme());
            for line in renderer.render_all(&session.transcript().await) {
                println!("{line}");
            }
        }
        ChatCommand::Help => println!("{HELP}"),
        ChatCommand::Quit => {}
    }
}

fn log_outcome(kind: &'static str, outcome: Result<Settlement, Rejection>) {
    match outcome {
        Ok(settlement) => debug!(kind, success = settlement.is_success(), "operation settled"),
        Err(rejection) => debug!(kind, %rejection, "submission ignored"),
    }
}
