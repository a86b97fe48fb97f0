//! Transcript growth invariants across arbitrary submission sequences.

use super::*;
use async_trait::async_trait;
use proptest::prelude::*;
use reqwest::StatusCode;
use shared::protocol::IngestResponse;

use crate::error::TransportError;

const FAIL_MARKER: &str = "!fail";

/// Settles immediately; any payload containing the marker fails.
struct MarkerBackend;

#[async_trait]
impl RagBackend for MarkerBackend {
    async fn ingest(&self, document: DocumentUpload) -> Result<IngestResponse, TransportError> {
        if document.file_name.contains(FAIL_MARKER) {
            return Err(TransportError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: None,
            });
        }
        Ok(IngestResponse::default())
    }

    async fn query(&self, query: &str) -> Result<String, TransportError> {
        if query.contains(FAIL_MARKER) {
            return Err(TransportError::Status {
                status: StatusCode::BAD_REQUEST,
                detail: Some("rejected".to_string()),
            });
        }
        Ok(format!("answer: {query}"))
    }
}

#[derive(Debug, Clone)]
enum Op {
    Query { text: String, fail: bool },
    Upload { name: String, fail: bool, empty: bool },
    Both { text: String, name: String },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        ("[a-z ]{0,12}", any::<bool>()).prop_map(|(text, fail)| Op::Query { text, fail }),
        ("[a-z]{1,8}", any::<bool>(), any::<bool>())
            .prop_map(|(name, fail, empty)| Op::Upload { name, fail, empty }),
        ("[a-z]{1,12}", "[a-z]{1,8}").prop_map(|(text, name)| Op::Both { text, name }),
    ]
}

fn with_marker(value: &str, fail: bool) -> String {
    if fail {
        format!("{value}{FAIL_MARKER}")
    } else {
        value.to_string()
    }
}

fn assert_grew_from(before: &Transcript, after: &Transcript) {
    assert!(after.len() >= before.len(), "transcript shrank");
    let old: Vec<_> = before.committed().collect();
    let new: Vec<_> = after.committed().collect();
    assert!(new.len() >= old.len(), "committed entries shrank");
    assert_eq!(&new[..old.len()], &old[..], "committed entries reordered");
}

proptest! {
    #[test]
    fn transcript_only_grows(ops in prop::collection::vec(arb_op(), 1..24)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");

        runtime.block_on(async {
            let session = ChatSession::with_backend(Arc::new(MarkerBackend), Theme::Terminal);
            let mut before = session.transcript().await;

            for op in ops {
                match op {
                    Op::Query { text, fail } => {
                        let _ = session.submit_query(&with_marker(&text, fail)).await;
                    }
                    Op::Upload { name, fail, empty } => {
                        let bytes = if empty { Vec::new() } else { b"doc".to_vec() };
                        let document = DocumentUpload::new(with_marker(&name, fail), bytes);
                        let _ = session.submit_document(document).await;
                    }
                    Op::Both { text, name } => {
                        let (query, upload) = tokio::join!(
                            session.submit_query(&text),
                            session.submit_document(DocumentUpload::new(name, b"doc".to_vec())),
                        );
                        assert!(query.is_ok());
                        assert!(upload.is_ok());
                    }
                }

                let after = session.transcript().await;
                assert_grew_from(&before, &after);
                assert!(after.pending().is_none());
                assert!(!session.query_state().await.is_awaiting_answer);
                assert!(!session.upload_state().await.is_uploading);
                before = after;
            }
        });
    }
}
