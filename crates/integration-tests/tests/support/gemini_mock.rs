#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct MockGeminiReply {
    pub status: StatusCode,
    pub body: Value,
    pub delay: Duration,
}

impl MockGeminiReply {
    pub fn text(text: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: json!({
                "candidates": [
                    { "content": { "role": "model", "parts": [{ "text": text }] } }
                ]
            }),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            body: json!({ "error": { "code": status.as_u16(), "status": "INTERNAL" } }),
            delay: Duration::ZERO,
        }
    }

    pub fn body(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone, Default)]
struct MockGeminiState {
    replies: Arc<Mutex<VecDeque<MockGeminiReply>>>,
    seen_payloads: Arc<Mutex<Vec<Value>>>,
}

pub struct MockGeminiServer {
    pub generate_content_url: String,
    state: MockGeminiState,
    handle: tokio::task::JoinHandle<()>,
}

impl MockGeminiServer {
    pub async fn start(replies: Vec<MockGeminiReply>) -> Self {
        let state = MockGeminiState {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            seen_payloads: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/v1beta/generate", post(generate_content))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("mock gemini listener should bind");
        let bind_addr = listener
            .local_addr()
            .expect("mock gemini listener local address should exist");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock gemini server should run");
        });

        Self {
            generate_content_url: format!("http://{bind_addr}/v1beta/generate"),
            state,
            handle,
        }
    }

    pub async fn seen_payloads(&self) -> Vec<Value> {
        self.state.seen_payloads.lock().await.clone()
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn generate_content(
    State(state): State<MockGeminiState>,
    Json(payload): Json<Value>,
) -> Response {
    let turn_count = payload["contents"].as_array().map_or(0, Vec::len);
    state.seen_payloads.lock().await.push(payload);

    let reply = state
        .replies
        .lock()
        .await
        .pop_front()
        .unwrap_or_else(|| MockGeminiReply::text(&format!("reply after {turn_count} turns")));

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    (reply.status, Json(reply.body)).into_response()
}
