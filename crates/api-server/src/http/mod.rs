use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Router, middleware};
use shared::sessions::SessionStore;
use shared::vision::ImageClassifier;

mod chat;
mod cors;
mod errors;
mod health;
mod observability;
mod predict;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub classifier: Arc<dyn ImageClassifier>,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

pub fn build_router(app_state: AppState) -> Router {
    let cors_layer = cors::cors_layer(&app_state.allowed_origins);
    let upload_limit = DefaultBodyLimit::max(app_state.max_upload_bytes);

    Router::new()
        .route("/healthz", get(health::healthz))
        .route(
            "/predict",
            post(predict::predict_disease).layer(upload_limit),
        )
        .route("/start_chat", post(chat::start_chat))
        .route("/chat", post(chat::chat))
        .route("/end_chat", post(chat::end_chat))
        .layer(cors_layer)
        .layer(middleware::from_fn(
            observability::request_observability_middleware,
        ))
        .with_state(app_state)
}
