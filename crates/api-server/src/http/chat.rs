use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{
    ChatRequest, ChatResponse, EndChatRequest, EndChatResponse, StartChatRequest,
    StartChatResponse,
};

use super::AppState;
use super::errors::{session_error_response, validation_error_response};

pub(super) async fn start_chat(
    State(state): State<AppState>,
    payload: Result<Json<StartChatRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return validation_error_response(rejection.status(), rejection.body_text()),
    };

    let session_id = state.sessions.create(&req.disease);

    (
        StatusCode::OK,
        Json(StartChatResponse {
            session_id,
            message: format!("Chat started for disease: {}", req.disease),
        }),
    )
        .into_response()
}

pub(super) async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return validation_error_response(rejection.status(), rejection.body_text()),
    };

    match state.sessions.append(&req.session_id, &req.user_message).await {
        Ok(response) => (StatusCode::OK, Json(ChatResponse { response })).into_response(),
        Err(err) => session_error_response(err),
    }
}

pub(super) async fn end_chat(
    State(state): State<AppState>,
    payload: Result<Json<EndChatRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return validation_error_response(rejection.status(), rejection.body_text()),
    };

    match state.sessions.delete(&req.session_id) {
        Ok(()) => (
            StatusCode::OK,
            Json(EndChatResponse {
                message: "Chat session ended.".to_string(),
            }),
        )
            .into_response(),
        Err(err) => session_error_response(err),
    }
}
