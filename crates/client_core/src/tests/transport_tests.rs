use super::*;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
struct ReceivedUpload {
    field: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone, Default)]
struct ServerState {
    uploads: Arc<Mutex<Vec<ReceivedUpload>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

async fn handle_upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Json<IngestResponse> {
    let mut names = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let upload = ReceivedUpload {
            field: field.name().map(str::to_string),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            bytes: field.bytes().await.map(|b| b.to_vec()).unwrap_or_default(),
        };
        names.extend(upload.file_name.clone());
        state.uploads.lock().await.push(upload);
    }
    Json(IngestResponse {
        message: Some(format!("Successfully uploaded and indexed {}", names.join(","))),
    })
}

async fn handle_chat(
    State(state): State<ServerState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorPayload>)> {
    state.queries.lock().await.push(request.query.clone());
    if request.query.contains("no index") {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorPayload::new(
                "No index found. Please upload a document first.",
            )),
        ));
    }
    Ok(Json(QueryResponse {
        response: format!("answer to: {}", request.query),
    }))
}

async fn handle_broken() -> impl IntoResponse {
    (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>")
}

async fn handle_empty_ok() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

async fn spawn_rag_server() -> (String, ServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/upload", post(handle_upload))
        .route("/api/chat", post(handle_chat))
        .route("/broken/upload", post(handle_broken))
        .route("/broken/chat", post(handle_broken))
        .route("/quiet/upload", post(handle_empty_ok))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

fn backend_for(base_url: &str) -> HttpRagBackend {
    let config = ClientConfig::from_base_url(base_url).expect("config");
    HttpRagBackend::new(&config)
}

#[tokio::test]
async fn ingest_sends_multipart_file_field() {
    let (server_url, state) = spawn_rag_server().await;
    let backend = backend_for(&format!("{server_url}/api"));

    let response = backend
        .ingest(
            DocumentUpload::new("report.pdf", b"%PDF-1.7 body".to_vec())
                .with_mime_type("application/pdf"),
        )
        .await
        .expect("ingest");

    assert_eq!(
        response.message.as_deref(),
        Some("Successfully uploaded and indexed report.pdf")
    );
    let uploads = state.uploads.lock().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].field.as_deref(), Some(INGEST_FORM_FIELD));
    assert_eq!(uploads[0].file_name.as_deref(), Some("report.pdf"));
    assert_eq!(uploads[0].content_type.as_deref(), Some("application/pdf"));
    assert_eq!(uploads[0].bytes, b"%PDF-1.7 body".to_vec());
}

#[tokio::test]
async fn ingest_accepts_any_success_status_without_body() {
    let (server_url, _state) = spawn_rag_server().await;
    let backend = backend_for(&format!("{server_url}/quiet"));

    let response = backend
        .ingest(DocumentUpload::new("notes.txt", b"hello".to_vec()))
        .await
        .expect("ingest");
    assert!(response.message.is_none());
}

#[tokio::test]
async fn ingest_reports_non_success_status() {
    let (server_url, _state) = spawn_rag_server().await;
    let backend = backend_for(&format!("{server_url}/broken"));

    let err = backend
        .ingest(DocumentUpload::new("report.pdf", b"data".to_vec()))
        .await
        .expect_err("must fail");
    match err {
        TransportError::Status { status, detail } => {
            assert_eq!(status, reqwest::StatusCode::BAD_GATEWAY);
            assert!(detail.is_none());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn query_posts_json_and_reads_response_field() {
    let (server_url, state) = spawn_rag_server().await;
    let backend = backend_for(&format!("{server_url}/api"));

    let answer = backend
        .query("What is the capital of France?")
        .await
        .expect("query");

    assert_eq!(answer, "answer to: What is the capital of France?");
    assert_eq!(
        state.queries.lock().await.as_slice(),
        ["What is the capital of France?".to_string()]
    );
}

#[tokio::test]
async fn query_failure_carries_endpoint_detail() {
    let (server_url, _state) = spawn_rag_server().await;
    let backend = backend_for(&format!("{server_url}/api"));

    let err = backend
        .query("anything? there is no index")
        .await
        .expect_err("must fail");
    assert_eq!(
        err.detail(),
        Some("No index found. Please upload a document first.")
    );
}

#[tokio::test]
async fn query_failure_without_json_body_has_no_detail() {
    let (server_url, _state) = spawn_rag_server().await;
    let backend = backend_for(&format!("{server_url}/broken"));

    let err = backend.query("hello").await.expect_err("must fail");
    assert!(matches!(err, TransportError::Status { .. }));
    assert!(err.detail().is_none());
}

#[tokio::test]
async fn unreachable_endpoint_is_a_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let backend = backend_for(&format!("http://{addr}/api"));

    let err = backend.query("hello").await.expect_err("must fail");
    assert!(matches!(err, TransportError::Request(_)));
    assert!(err.detail().is_none());
}
