use crate::annotate::Annotator;
use crate::detection::{Detection, RawPrediction};
use crate::inference::{InferenceClient, InferenceError, InferenceResponse};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

const JPEG_QUALITY: u8 = 90;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Temp file error: {0}")]
    TempFile(#[from] std::io::Error),
    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("Malformed prediction from inference provider: {0}")]
    MalformedPrediction(String),
    #[error("Failed to encode annotated image: {0}")]
    Encode(#[source] image::ImageError),
}

#[derive(Debug, Serialize)]
pub struct PipelineOutput {
    pub detections: Vec<Detection>,
    pub annotated_image: String,
    pub image_format: String,
}

/// The request/response transformation from raw image bytes to annotated
/// image plus structured detections. One temp-file write and one provider
/// call per invocation, no other I/O.
pub struct AnnotationPipeline {
    client: Arc<dyn InferenceClient>,
    annotator: Annotator,
}

impl AnnotationPipeline {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            client,
            annotator: Annotator::new(),
        }
    }

    #[instrument(skip(self, image_bytes))]
    pub async fn process(&self, image_bytes: &[u8]) -> Result<PipelineOutput, PipelineError> {
        let decoded = image::load_from_memory(image_bytes).map_err(PipelineError::Decode)?;
        let mut image = decoded.to_rgb8();

        let response = self.stage_and_infer(&image).await?;

        let mut detections = Vec::with_capacity(response.predictions.len());
        for prediction in &response.predictions {
            let raw: RawPrediction = serde_json::from_value(prediction.clone())
                .map_err(|e| PipelineError::MalformedPrediction(e.to_string()))?;
            detections.push(Detection::from_prediction(&raw));
        }
        tracing::debug!("Provider returned {} detections", detections.len());

        self.annotator.annotate(&mut image, &detections);

        let annotated_image = BASE64.encode(encode_jpeg(&image)?);

        Ok(PipelineOutput {
            detections,
            annotated_image,
            image_format: "jpg".to_string(),
        })
    }

    /// Stages the working image in a uniquely-named temp file for the
    /// provider call. The file is removed when `staged` drops, on the
    /// error paths as well.
    async fn stage_and_infer(
        &self,
        image: &RgbImage,
    ) -> Result<InferenceResponse, PipelineError> {
        let mut staged = tempfile::Builder::new()
            .prefix("skin-analysis-")
            .suffix(".jpg")
            .tempfile()?;
        staged.write_all(&encode_jpeg(image)?)?;
        staged.flush()?;

        let response = self.client.infer(staged.path()).await?;
        Ok(response)
    }
}

fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, PipelineError> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
        .encode_image(image)
        .map_err(PipelineError::Encode)?;
    Ok(buffer)
}
