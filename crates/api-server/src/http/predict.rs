use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::PredictResponse;
use shared::vision::classify_image;
use tracing::info;

use super::AppState;
use super::errors::{bad_request_response, internal_error_response, validation_error_response};

const FILE_FIELD: &str = "file";

pub(super) async fn predict_disease(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => return validation_error_response(rejection.status(), rejection.body_text()),
    };

    let image_bytes = match read_file_field(&mut multipart).await {
        Ok(Some(image_bytes)) => image_bytes,
        Ok(None) => {
            return bad_request_response("missing_file", "Multipart field 'file' is required");
        }
        Err(err) => return validation_error_response(err.status(), err.body_text()),
    };

    let upload_bytes = image_bytes.len();
    let classifier = state.classifier.clone();
    let prediction =
        tokio::task::spawn_blocking(move || classify_image(classifier.as_ref(), &image_bytes))
            .await;

    match prediction {
        Ok(Ok(label)) => {
            info!(upload_bytes, predicted_disease = label, "image classified");
            (
                StatusCode::OK,
                Json(PredictResponse {
                    predicted_disease: label.to_string(),
                }),
            )
                .into_response()
        }
        Ok(Err(err)) => internal_error_response(format!("An error occurred: {err}")),
        Err(err) => internal_error_response(format!("An error occurred: {err}")),
    }
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Option<Bytes>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            return field.bytes().await.map(Some);
        }
    }

    Ok(None)
}
