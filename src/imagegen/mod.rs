//! Text-to-image generation through third-party providers.
//!
//! Every provider is reduced to the same contract: a prompt goes in, an
//! image URL or `data:` URI comes out.

mod deepai;
mod openai;
mod replicate;
mod stability;

use axum::http::StatusCode;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// An image generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Stability,
    OpenAi,
    DeepAi,
    Replicate,
}

impl Provider {
    /// Identifier used in requests.
    pub fn id(&self) -> &'static str {
        match self {
            Provider::Stability => "stability",
            Provider::OpenAi => "openai",
            Provider::DeepAi => "deepai",
            Provider::Replicate => "replicate",
        }
    }

    /// Human-readable name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Stability => "Stability",
            Provider::OpenAi => "OpenAI",
            Provider::DeepAi => "DeepAI",
            Provider::Replicate => "Replicate",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Provider::Stability => "Stability image generation failed.",
            Provider::OpenAi => "No image returned from OpenAI",
            Provider::DeepAi => "No image URL returned",
            Provider::Replicate => "Replicate image generation failed",
        }
    }

    pub fn all() -> [Provider; 4] {
        [
            Provider::Stability,
            Provider::OpenAi,
            Provider::DeepAi,
            Provider::Replicate,
        ]
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Provider {
    type Err = ImageGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::all()
            .into_iter()
            .find(|provider| provider.id() == s)
            .ok_or_else(|| ImageGenError::UnknownProvider(s.to_string()))
    }
}

#[derive(Debug)]
pub enum ImageGenError {
    /// The provider's credential is not configured.
    MissingKey(Provider),
    UnknownProvider(String),
    EmptyPrompt,
    /// The provider answered without an image, or could not be reached.
    Failed { provider: Provider, detail: String },
    /// Polling ran out of attempts before the prediction finished.
    Timeout { attempts: u32 },
}

impl ImageGenError {
    fn failed(provider: Provider, detail: impl fmt::Display) -> Self {
        ImageGenError::Failed {
            provider,
            detail: detail.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ImageGenError::MissingKey(_) => StatusCode::FORBIDDEN,
            ImageGenError::EmptyPrompt => StatusCode::BAD_REQUEST,
            ImageGenError::UnknownProvider(_)
            | ImageGenError::Failed { .. }
            | ImageGenError::Timeout { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ImageGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageGenError::MissingKey(Provider::OpenAi) => write!(f, "OpenAI not configured"),
            ImageGenError::MissingKey(provider) => write!(f, "{} API key missing", provider.name()),
            ImageGenError::UnknownProvider(_) => write!(f, "No Image Generation Provider found."),
            ImageGenError::EmptyPrompt => write!(f, "Prompt is required"),
            ImageGenError::Failed { provider, .. } => write!(f, "{}", provider.failure_message()),
            ImageGenError::Timeout { .. } => write!(f, "{}", Provider::Replicate.failure_message()),
        }
    }
}

impl std::error::Error for ImageGenError {}

/// Base URLs of the provider APIs.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub stability: String,
    pub openai: String,
    pub deepai: String,
    pub replicate: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            stability: "https://api.stability.ai".to_string(),
            openai: "https://api.openai.com".to_string(),
            deepai: "https://api.deepai.org".to_string(),
            replicate: "https://api.replicate.com".to_string(),
        }
    }
}

/// How long to wait for asynchronous predictions.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 20,
        }
    }
}

/// Provider credentials and endpoints.
#[derive(Debug, Clone, Default)]
pub struct ImageGenConfig {
    pub stability_key: Option<String>,
    pub openai_key: Option<String>,
    pub deepai_key: Option<String>,
    pub replicate_token: Option<String>,
    pub endpoints: Endpoints,
    pub poll: PollSettings,
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl ImageGenConfig {
    /// Load credentials from environment variables
    pub fn from_env() -> Self {
        Self {
            stability_key: env_non_empty("STABILITY_API_KEY"),
            openai_key: env_non_empty("OPENAI_API_KEY"),
            deepai_key: env_non_empty("DEEPAI_API_KEY"),
            replicate_token: env_non_empty("REPLICATE_API_TOKEN"),
            endpoints: Endpoints::default(),
            poll: PollSettings::default(),
        }
    }

    fn key(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Stability => self.stability_key.as_deref(),
            Provider::OpenAi => self.openai_key.as_deref(),
            Provider::DeepAi => self.deepai_key.as_deref(),
            Provider::Replicate => self.replicate_token.as_deref(),
        }
    }

    /// Providers with a credential configured.
    pub fn configured(&self) -> Vec<Provider> {
        Provider::all()
            .into_iter()
            .filter(|provider| self.key(*provider).is_some())
            .collect()
    }
}

/// Dispatches prompts to the configured providers.
#[derive(Debug, Clone)]
pub struct ImageGenerator {
    client: reqwest::Client,
    config: ImageGenConfig,
}

impl ImageGenerator {
    pub fn new(config: ImageGenConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ImageGenConfig {
        &self.config
    }

    /// Generates an image for `prompt`. Without a provider, Stability is used.
    ///
    /// Returns an image URL or a `data:` URI.
    pub async fn generate(
        &self,
        provider: Option<&str>,
        prompt: &str,
    ) -> Result<String, ImageGenError> {
        let provider = match provider {
            Some(name) => name.parse()?,
            None => Provider::default(),
        };
        if prompt.trim().is_empty() {
            return Err(ImageGenError::EmptyPrompt);
        }
        let key = self
            .config
            .key(provider)
            .ok_or(ImageGenError::MissingKey(provider))?;

        tracing::info!(%provider, "Generating image");
        let endpoints = &self.config.endpoints;
        let result = match provider {
            Provider::Stability => {
                stability::generate(&self.client, &endpoints.stability, key, prompt).await
            }
            Provider::OpenAi => {
                openai::generate(&self.client, &endpoints.openai, key, prompt).await
            }
            Provider::DeepAi => {
                deepai::generate(&self.client, &endpoints.deepai, key, prompt).await
            }
            Provider::Replicate => {
                replicate::generate(
                    &self.client,
                    &endpoints.replicate,
                    key,
                    prompt,
                    self.config.poll,
                )
                .await
            }
        };

        if let Err(e) = &result {
            match e {
                ImageGenError::Failed { detail, .. } => {
                    tracing::error!(%provider, detail = %detail, "Image generation failed")
                }
                ImageGenError::Timeout { attempts } => {
                    tracing::error!(%provider, attempts, "Image generation timed out")
                }
                other => tracing::error!(%provider, error = %other, "Image generation failed"),
            }
        }
        result
    }
}
