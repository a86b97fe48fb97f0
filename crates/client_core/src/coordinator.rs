use std::sync::Arc;

use shared::domain::{Entry, EntryId, QueryState, UploadState};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    config::ClientConfig,
    error::Rejection,
    theme::Theme,
    transcript::{Transcript, TranscriptStore},
    transport::HttpRagBackend,
    ClientEvent, DocumentUpload, RagBackend,
};

const EVENT_CAPACITY: usize = 256;

/// How a dispatched operation settled, with the entry it committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Success(Entry),
    Failure(Entry),
}

impl Settlement {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn entry(&self) -> &Entry {
        match self {
            Self::Success(entry) | Self::Failure(entry) => entry,
        }
    }
}

/// Coordinates ingestion and query operations against one transcript.
///
/// At most one operation of each kind is outstanding. The two kinds are
/// independent and may overlap. The state lock is never held across a
/// dispatch, so an ingestion and a query settle in whatever order the service
/// answers them.
pub struct ChatSession {
    backend: Arc<dyn RagBackend>,
    theme: Theme,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<ClientEvent>,
}

struct SessionState {
    transcript: TranscriptStore,
    upload: UploadState,
    query: QueryState,
    input: String,
    next_entry_id: u64,
}

impl SessionState {
    fn next_id(&mut self) -> EntryId {
        self.next_entry_id += 1;
        EntryId(self.next_entry_id)
    }

    fn resolve_placeholder(&mut self, entry: Entry) -> Transcript {
        let snapshot = self.transcript.snapshot();
        if snapshot.pending().is_some() {
            if let Ok(resolved) = self.transcript.replace_last(entry.clone()) {
                return resolved;
            }
        }
        warn!(entry_id = entry.id.0, "no pending placeholder to resolve; appending");
        self.transcript.append(entry)
    }
}

impl ChatSession {
    pub fn new(config: &ClientConfig) -> Arc<Self> {
        Self::with_backend(Arc::new(HttpRagBackend::new(config)), config.theme)
    }

    pub fn with_backend(backend: Arc<dyn RagBackend>, theme: Theme) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let mut state = SessionState {
            transcript: TranscriptStore::new(),
            upload: UploadState::default(),
            query: QueryState::default(),
            input: String::new(),
            next_entry_id: 0,
        };
        let greeting = Entry::system(state.next_id(), theme.greeting());
        state.transcript.append(greeting);

        Arc::new(Self {
            backend,
            theme,
            inner: Mutex::new(state),
            events,
        })
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn transcript(&self) -> Transcript {
        self.inner.lock().await.transcript.snapshot()
    }

    pub async fn upload_state(&self) -> UploadState {
        self.inner.lock().await.upload.clone()
    }

    pub async fn query_state(&self) -> QueryState {
        self.inner.lock().await.query.clone()
    }

    pub async fn input(&self) -> String {
        self.inner.lock().await.input.clone()
    }

    /// Replaces the input buffer. Editing is refused while a query is awaiting
    /// its answer.
    pub async fn set_input(&self, text: impl Into<String>) -> Result<(), Rejection> {
        let mut guard = self.inner.lock().await;
        if guard.query.is_awaiting_answer {
            return Err(Rejection::QueryInFlight);
        }
        guard.input = text.into();
        Ok(())
    }

    pub async fn can_submit_query(&self) -> bool {
        let guard = self.inner.lock().await;
        !guard.query.is_awaiting_answer && !guard.input.trim().is_empty()
    }

    /// Submits whatever is in the input buffer.
    pub async fn submit_input(&self) -> Result<Settlement, Rejection> {
        let text = self.inner.lock().await.input.clone();
        self.submit_query(&text).await
    }

    pub async fn submit_query(&self, text: &str) -> Result<Settlement, Rejection> {
        if text.trim().is_empty() {
            debug!("ignoring empty query");
            return Err(Rejection::EmptyQuery);
        }

        {
            let mut guard = self.inner.lock().await;
            if guard.query.is_awaiting_answer {
                debug!("ignoring query while another is awaiting an answer");
                return Err(Rejection::QueryInFlight);
            }

            let user = Entry::user(guard.next_id(), text);
            let snapshot = guard.transcript.append(user);
            self.publish(ClientEvent::TranscriptChanged(snapshot));
            guard.input.clear();

            guard.query = QueryState {
                is_awaiting_answer: true,
                pending_query_text: Some(text.to_string()),
            };
            let placeholder = Entry::placeholder(guard.next_id(), self.theme.pending_indicator());
            let snapshot = guard.transcript.append(placeholder);
            self.publish(ClientEvent::QueryStateChanged(guard.query.clone()));
            self.publish(ClientEvent::TranscriptChanged(snapshot));
        }

        info!(chars = text.chars().count(), "dispatching query");
        let result = self.backend.query(text).await;

        let mut guard = self.inner.lock().await;
        let id = guard.next_id();
        let settlement = match result {
            Ok(answer) => {
                info!(chars = answer.chars().count(), "query answered");
                Settlement::Success(Entry::system(id, answer))
            }
            Err(err) => {
                warn!(error = %err, "query failed");
                Settlement::Failure(Entry::system(id, self.theme.query_failed(err.detail())))
            }
        };

        let snapshot = guard.resolve_placeholder(settlement.entry().clone());
        guard.query = QueryState::default();
        self.publish(ClientEvent::TranscriptChanged(snapshot));
        self.publish(ClientEvent::QueryStateChanged(guard.query.clone()));
        Ok(settlement)
    }

    pub async fn submit_document(&self, document: DocumentUpload) -> Result<Settlement, Rejection> {
        if document.bytes.is_empty() {
            debug!(file_name = %document.file_name, "ignoring empty document");
            return Err(Rejection::MissingDocument);
        }

        let file_name = document.file_name.clone();
        {
            let mut guard = self.inner.lock().await;
            if guard.upload.is_uploading {
                debug!(file_name = %file_name, "ignoring document while another is uploading");
                return Err(Rejection::IngestionInFlight);
            }
            guard.upload = UploadState {
                active_file_name: Some(file_name.clone()),
                is_uploading: true,
            };
            self.publish(ClientEvent::UploadStateChanged(guard.upload.clone()));
        }

        info!(file_name = %file_name, bytes = document.bytes.len(), "dispatching document for ingestion");
        let result = self.backend.ingest(document).await;

        let mut guard = self.inner.lock().await;
        let id = guard.next_id();
        let settlement = match result {
            Ok(_) => {
                info!(file_name = %file_name, "document indexed");
                Settlement::Success(Entry::system(id, self.theme.ingest_succeeded(&file_name)))
            }
            Err(err) => {
                warn!(file_name = %file_name, error = %err, "document ingestion failed");
                Settlement::Failure(Entry::system(id, self.theme.ingest_failed(&file_name)))
            }
        };

        let snapshot = guard.transcript.append(settlement.entry().clone());
        guard.upload.is_uploading = false;
        self.publish(ClientEvent::TranscriptChanged(snapshot));
        self.publish(ClientEvent::UploadStateChanged(guard.upload.clone()));
        Ok(settlement)
    }

    fn publish(&self, event: ClientEvent) {
        // No subscribers is fine; the state stays readable on demand.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/coordinator_proptests.rs"]
mod proptests;
