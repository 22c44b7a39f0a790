//! Client for the image generation server.

use serde::Deserialize;

use crate::server::{GenerateImageRequest, GenerateImageResponse};

const FALLBACK_ERROR: &str = "Image generation failed";

#[derive(Debug)]
pub enum ClientError {
    /// The server could not be reached or answered garbage.
    Http(reqwest::Error),
    /// The server answered with an error message.
    Server(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Http(e) => write!(f, "HTTP error: {}", e),
            ClientError::Server(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e)
    }
}

#[derive(Deserialize)]
struct ServerError {
    error: Option<String>,
}

pub struct ImageClient {
    client: reqwest::Client,
    base_url: String,
}

impl ImageClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Asks the server for an image and returns its URL or `data:` URI.
    pub async fn generate(
        &self,
        prompt: &str,
        provider: Option<&str>,
    ) -> Result<String, ClientError> {
        let response = self
            .client
            .post(format!("{}/generate-image", self.base_url))
            .json(&GenerateImageRequest {
                prompt: prompt.to_string(),
                provider: provider.map(str::to_string),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let message = response
                .json::<ServerError>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| FALLBACK_ERROR.to_string());
            return Err(ClientError::Server(message));
        }

        let body: GenerateImageResponse = response.json().await?;
        Ok(body.image)
    }
}
