use async_trait::async_trait;
use shared::{
    domain::{QueryState, UploadState},
    protocol::IngestResponse,
};

pub mod config;
mod coordinator;
pub mod error;
pub mod theme;
pub mod transcript;
pub mod transport;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use coordinator::{ChatSession, Settlement};
pub use error::{ConfigError, Rejection, TranscriptError, TransportError};
pub use theme::Theme;
pub use transcript::{Transcript, TranscriptStore};
pub use transport::HttpRagBackend;

/// A document selected for ingestion.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// The remote retrieval service: one endpoint to ingest, one to ask.
#[async_trait]
pub trait RagBackend: Send + Sync {
    async fn ingest(&self, document: DocumentUpload) -> Result<IngestResponse, TransportError>;
    async fn query(&self, query: &str) -> Result<String, TransportError>;
}

/// Change notifications for presentation layers.
///
/// Each event carries an immutable snapshot, so a receiver that lags behind can
/// simply re-read the latest state from the session.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    TranscriptChanged(Transcript),
    UploadStateChanged(UploadState),
    QueryStateChanged(QueryState),
}
