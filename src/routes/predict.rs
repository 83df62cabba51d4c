use crate::inference::InferenceError;
use crate::pipeline::{PipelineError, PipelineOutput};
use crate::server::SharedState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use serde_json::json;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("No image provided")]
    MissingImage,
    #[error("Invalid multipart request: {0}")]
    InvalidMultipart(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl PredictError {
    fn status_code(&self) -> StatusCode {
        match self {
            PredictError::MissingImage => StatusCode::BAD_REQUEST,
            PredictError::InvalidMultipart(_) => StatusCode::BAD_REQUEST,
            PredictError::Pipeline(PipelineError::Decode(_)) => StatusCode::BAD_REQUEST,
            PredictError::Pipeline(PipelineError::TempFile(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PredictError::Pipeline(PipelineError::Encode(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            // Reading the staged file back is local filesystem IO, not a
            // provider failure.
            PredictError::Pipeline(PipelineError::Inference(
                InferenceError::StagedImageRead(_),
            )) => StatusCode::INTERNAL_SERVER_ERROR,
            PredictError::Pipeline(PipelineError::Inference(_)) => StatusCode::BAD_GATEWAY,
            PredictError::Pipeline(PipelineError::MalformedPrediction(_)) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Predict request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[instrument(skip(state, multipart))]
pub async fn predict(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PipelineOutput>, PredictError> {
    // A POST that is not multipart at all cannot carry the image field.
    let mut multipart = multipart.map_err(|_| PredictError::MissingImage)?;
    let image_bytes = extract_image_field(&mut multipart).await?;
    let output = state.pipeline.process(&image_bytes).await?;
    Ok(Json(output))
}

async fn extract_image_field(multipart: &mut Multipart) -> Result<Bytes, PredictError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PredictError::InvalidMultipart(e.to_string()))?
    {
        if field.name() == Some("image") {
            return field
                .bytes()
                .await
                .map_err(|e| PredictError::InvalidMultipart(e.to_string()));
        }
    }
    Err(PredictError::MissingImage)
}
