use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use shared::{
    error::ErrorPayload,
    protocol::{IngestResponse, QueryRequest, QueryResponse, INGEST_FORM_FIELD},
};
use tracing::debug;
use url::Url;

use crate::{config::ClientConfig, error::TransportError, DocumentUpload, RagBackend};

/// [`RagBackend`] over HTTP. No timeout and no retries are applied; a request
/// runs until the endpoint or the network settles it.
pub struct HttpRagBackend {
    http: Client,
    ingestion_endpoint: Url,
    query_endpoint: Url,
}

impl HttpRagBackend {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http: Client, config: &ClientConfig) -> Self {
        Self {
            http,
            ingestion_endpoint: config.ingestion_endpoint.clone(),
            query_endpoint: config.query_endpoint.clone(),
        }
    }
}

#[async_trait]
impl RagBackend for HttpRagBackend {
    async fn ingest(&self, document: DocumentUpload) -> Result<IngestResponse, TransportError> {
        let mut part = Part::bytes(document.bytes).file_name(document.file_name);
        if let Some(mime_type) = document.mime_type.as_deref() {
            part = part.mime_str(mime_type)?;
        }
        let form = Form::new().part(INGEST_FORM_FIELD, part);

        let response = self
            .http
            .post(self.ingestion_endpoint.clone())
            .multipart(form)
            .send()
            .await?;
        let body = success_body(response).await?;

        // Any 2xx counts; the acknowledgement body is informational only.
        Ok(serde_json::from_slice(&body).unwrap_or_default())
    }

    async fn query(&self, query: &str) -> Result<String, TransportError> {
        let response = self
            .http
            .post(self.query_endpoint.clone())
            .json(&QueryRequest {
                query: query.to_string(),
            })
            .send()
            .await?;
        let body = success_body(response).await?;
        let parsed: QueryResponse = serde_json::from_slice(&body)?;
        Ok(parsed.response)
    }
}

async fn success_body(response: Response) -> Result<Vec<u8>, TransportError> {
    let status = response.status();
    let body = response.bytes().await?;
    if status.is_success() {
        return Ok(body.to_vec());
    }

    let detail = ErrorPayload::parse(&body).and_then(|payload| payload.detail_message());
    debug!(%status, detail = detail.as_deref().unwrap_or(""), "endpoint rejected request");
    Err(TransportError::Status { status, detail })
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
