//! Test utilities for dailyspend-core
//!
//! Provides a mock OpenAI-compatible completion server that can be used for
//! integration tests of the language-model backend and the pipeline.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// A canned structured reply with two insights
pub const STRUCTURED_REPLY: &str = r#"{"insights": [
  {"title": "Dining out is climbing", "message": "Food spending rose for three months.", "type": "spending", "priority": "high", "actionItems": ["Cook at home twice a week", "Set a weekly food budget"]},
  {"title": "Build a cushion", "message": "You have room to save more.", "type": "saving", "priority": "low", "actionItems": ["Automate a transfer on payday"]}
]}"#;

/// How the mock server answers `/v1/chat/completions`
#[derive(Debug, Clone)]
pub enum CompletionMode {
    /// 200 with `choices[0].message.content` set to this text
    Reply(String),
    /// Respond with this HTTP status and a short error body
    Status(u16),
    /// 200 with a body that lacks `choices`
    MalformedEnvelope,
}

impl CompletionMode {
    pub fn structured() -> Self {
        Self::Reply(STRUCTURED_REPLY.to_string())
    }

    pub fn plain_text(text: &str) -> Self {
        Self::Reply(text.to_string())
    }
}

/// A request received by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

impl RecordedRequest {
    /// Text of the first user message
    pub fn prompt(&self) -> Option<&str> {
        self.body["messages"][0]["content"].as_str()
    }
}

struct ServerState {
    mode: Mutex<CompletionMode>,
    delay: Mutex<Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Mock completion server for tests
pub struct MockCompletionServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockCompletionServer {
    /// Start the mock server on an available port
    pub async fn start(mode: CompletionMode) -> Self {
        let state = Arc::new(ServerState {
            mode: Mutex::new(mode),
            delay: Mutex::new(Duration::ZERO),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", post(handle_completions))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_mode(&self, mode: CompletionMode) {
        *self.state.mode.lock().unwrap() = mode;
    }

    /// Delay every reply by `delay`
    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = delay;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockCompletionServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_completions(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let model = body["model"].as_str().unwrap_or("mock").to_string();

    state
        .requests
        .lock()
        .unwrap()
        .push(RecordedRequest { authorization, body });

    let delay = *state.delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let mode = state.mode.lock().unwrap().clone();
    match mode {
        CompletionMode::Reply(content) => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        CompletionMode::Status(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(json!({"error": {"message": "mock failure"}}))).into_response()
        }
        CompletionMode::MalformedEnvelope => Json(json!({"result": "no choices here"})).into_response(),
    }
}
