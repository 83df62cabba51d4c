use crate::config::InferenceConfig;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Failed to read staged image: {0}")]
    StagedImageRead(#[from] std::io::Error),
    #[error("Request to inference provider failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Inference provider returned {status}: {body}")]
    ErrorStatus { status: StatusCode, body: String },
    #[error("Invalid response from inference provider: {0}")]
    InvalidResponse(String),
}

/// Raw provider response. Prediction records stay as JSON values here so
/// that a malformed record can be reported per entry further down the
/// pipeline instead of failing the whole response parse.
#[derive(Debug, Deserialize)]
pub struct InferenceResponse {
    pub predictions: Vec<serde_json::Value>,
}

/// Seam between the pipeline and the hosted model, so tests can substitute
/// a fake provider.
#[async_trait]
pub trait InferenceClient: Send + Sync + 'static {
    /// Runs the hosted model against the image staged at `image_path`.
    async fn infer(&self, image_path: &Path) -> Result<InferenceResponse, InferenceError>;
}

/// Client for Roboflow's hosted detection API. The provider takes the
/// image as a base64 body on `POST {api_url}/{model_id}?api_key=...`.
pub struct RoboflowClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl RoboflowClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let endpoint = format!(
            "{}/{}",
            config.api_url.trim_end_matches('/'),
            config.model_id
        );
        tracing::info!("Inference client configured for {}", endpoint);

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl InferenceClient for RoboflowClient {
    async fn infer(&self, image_path: &Path) -> Result<InferenceResponse, InferenceError> {
        let image_bytes = tokio::fs::read(image_path).await?;

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("api_key", self.api_key.as_str())])
            .header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(BASE64.encode(&image_bytes))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(InferenceError::ErrorStatus { status, body });
        }

        serde_json::from_str::<InferenceResponse>(&body)
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))
    }
}
