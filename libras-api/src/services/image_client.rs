//! Image-generation provider client

use async_trait::async_trait;
use libras_common::config::ImageConfig;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Image provider errors
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Network error: {0}")]
    Network(String),

    /// Provider asked us to slow down (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Response decoded but carried no image URL
    #[error("No image in response")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Black-box prompt-to-URL image generation
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ImageError>;
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    images: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

/// Production image-generation client
pub struct FluxImageClient {
    http_client: reqwest::Client,
    config: ImageConfig,
}

impl FluxImageClient {
    pub fn new(config: ImageConfig) -> Result<Self, ImageError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ImageError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl ImageProvider for FluxImageClient {
    async fn generate(&self, prompt: &str) -> Result<String, ImageError> {
        let response = self
            .http_client
            .post(&self.config.base_url)
            .bearer_auth(&self.config.api_token)
            .json(&json!({
                "provider": self.config.provider,
                "model": self.config.model,
                "prompt": prompt,
                "size": self.config.size,
            }))
            .send()
            .await
            .map_err(|e| ImageError::Network(e.to_string()))?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(ImageError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ImageError::Api(status.as_u16(), error_text));
        }

        let generation: GenerationResponse = response
            .json()
            .await
            .map_err(|e| ImageError::Parse(e.to_string()))?;

        generation
            .images
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .ok_or(ImageError::EmptyResponse)
    }
}
