//! Terminal presentation of the transcript.

use std::{collections::HashSet, sync::Arc};

use client_core::{ChatSession, ClientEvent, Theme, Transcript};
use shared::domain::{Entry, EntryId, QueryState, Role, UploadState};
use tokio::sync::{broadcast::error::RecvError, broadcast::Receiver, oneshot};
use tracing::debug;

pub fn render_entry(theme: Theme, entry: &Entry) -> String {
    let label = match entry.role {
        Role::User => theme.user_label(),
        Role::System => theme.system_label(),
    };
    let stamp = entry.created_at.format("%H:%M:%S");
    if entry.is_pending {
        format!("[{stamp}] {label}: {}", theme.pending_indicator())
    } else {
        format!("[{stamp}] {label}: {}", entry.content)
    }
}

pub fn render_status(theme: Theme, upload: &UploadState, query: &QueryState) -> String {
    let document = match (&upload.active_file_name, upload.is_uploading) {
        (Some(name), true) => format!("{name} ({})", theme.uploading_indicator()),
        (Some(name), false) => name.clone(),
        (None, _) => "none".to_string(),
    };
    let question = match (&query.pending_query_text, query.is_awaiting_answer) {
        (Some(text), true) => format!("awaiting answer to \"{text}\""),
        _ => "idle".to_string(),
    };
    format!("document: {document} | query: {question}")
}

/// Tracks what has already been printed so each committed entry appears once,
/// in transcript order, no matter how many snapshots arrive.
///
/// The pending placeholder is never part of the printed log. It is announced
/// once as a status line, since entries committed while it is outstanding land
/// ahead of it.
#[derive(Debug)]
pub struct TranscriptRenderer {
    theme: Theme,
    printed: HashSet<EntryId>,
    announced_pending: Option<EntryId>,
}

impl TranscriptRenderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            printed: HashSet::new(),
            announced_pending: None,
        }
    }

    pub fn render_new(&mut self, transcript: &Transcript) -> Vec<String> {
        let mut lines: Vec<String> = transcript
            .committed()
            .filter(|entry| self.printed.insert(entry.id))
            .map(|entry| render_entry(self.theme, entry))
            .collect();
        if let Some(pending) = transcript.pending() {
            if self.announced_pending != Some(pending.id) {
                self.announced_pending = Some(pending.id);
                lines.push(format!("  ({})", self.theme.pending_indicator()));
            }
        }
        lines
    }

    pub fn render_all(&self, transcript: &Transcript) -> Vec<String> {
        transcript
            .iter()
            .map(|entry| render_entry(self.theme, entry))
            .collect()
    }
}

/// Redraws from session events until `shutdown` fires, then drains whatever
/// was already published.
pub async fn run(
    session: Arc<ChatSession>,
    mut events: Receiver<ClientEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut renderer = TranscriptRenderer::new(session.theme());
    print_lines(renderer.render_new(&session.transcript().await));

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => handle_event(&mut renderer, session.theme(), event),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "renderer lagged; redrawing from latest snapshot");
                    print_lines(renderer.render_new(&session.transcript().await));
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut shutdown => {
                while let Ok(event) = events.try_recv() {
                    handle_event(&mut renderer, session.theme(), event);
                }
                break;
            }
        }
    }
}

fn handle_event(renderer: &mut TranscriptRenderer, theme: Theme, event: ClientEvent) {
    match event {
        ClientEvent::TranscriptChanged(snapshot) => print_lines(renderer.render_new(&snapshot)),
        ClientEvent::UploadStateChanged(UploadState {
            active_file_name: Some(name),
            is_uploading: true,
        }) => println!("  ({} {name})", theme.uploading_indicator()),
        ClientEvent::UploadStateChanged(_) | ClientEvent::QueryStateChanged(_) => {}
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
