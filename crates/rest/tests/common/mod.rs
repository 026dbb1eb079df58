//! Common test utilities for search API testing.
//!
//! Provides a recording in-memory [`SearchEngine`] and a test server
//! factory.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::HeaderName;
use axum_test::TestServer;
use scholar_rest::{AppState, ServerConfig, create_app};
use scholar_search::{BackendError, PromotionSource, SearchEngine};
use serde_json::{Value, json};

pub const X_ORGANIZATION_ID: HeaderName = HeaderName::from_static("x-organization-id");

/// One request received by the engine.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    pub index: String,
    pub body: Value,
}

/// A search engine answering with a canned response and recording every
/// request.
pub struct RecordingEngine {
    response: Result<Value, String>,
    requests: Mutex<Vec<RecordedSearch>>,
}

impl RecordingEngine {
    /// An engine answering every search with `response`.
    pub fn answering(response: Value) -> Self {
        Self {
            response: Ok(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// An engine that is unreachable.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RecordedSearch> {
        self.requests.lock().unwrap().clone()
    }

    /// The body of the only request received.
    pub fn last_body(&self) -> Value {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one engine request");
        requests[0].body.clone()
    }
}

#[async_trait]
impl SearchEngine for RecordingEngine {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn search(&self, index: &str, body: &Value) -> Result<Value, BackendError> {
        self.requests.lock().unwrap().push(RecordedSearch {
            index: index.to_string(),
            body: body.clone(),
        });

        self.response
            .clone()
            .map_err(|message| BackendError::Unavailable {
                backend_name: self.name().to_string(),
                message,
            })
    }
}

/// An engine response with `count` hits out of `total`.
pub fn engine_response(total: u64, count: usize) -> Value {
    let hits: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "_id": format!("doc-{i}"),
                "_source": {
                    "id": format!("https://api.test/publication/doc-{i}"),
                    "identifier": format!("doc-{i}"),
                    "entityDescription": {
                        "mainTitle": format!("Ocean study {i}"),
                        "contributors": [
                            { "identity": { "name": "Ada Lovelace" } },
                            { "identity": { "name": "Grace Hopper" } }
                        ]
                    }
                },
                "sort": [1.0, format!("doc-{i}")]
            })
        })
        .collect();

    json!({
        "took": 4,
        "hits": {
            "total": { "value": total, "relation": "eq" },
            "hits": hits
        },
        "aggregations": {
            "type": {
                "doc_count": total,
                "type": {
                    "buckets": [ { "key": "AcademicArticle", "doc_count": total } ]
                }
            }
        }
    })
}

/// Creates a test server over `engine`.
pub fn create_test_server(engine: Arc<RecordingEngine>) -> TestServer {
    create_test_server_with(engine, None)
}

/// Creates a test server over `engine` with an optional promotion source.
pub fn create_test_server_with(
    engine: Arc<RecordingEngine>,
    promotions: Option<Arc<dyn PromotionSource>>,
) -> TestServer {
    let mut state =
        AppState::new(engine, ServerConfig::for_testing()).expect("Failed to compile catalogues");
    if let Some(promotions) = promotions {
        state = state.with_promotions(promotions);
    }

    TestServer::new(create_app(state)).expect("Failed to create test server")
}
