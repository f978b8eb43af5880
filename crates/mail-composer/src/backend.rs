//! Generative-text backend port and HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend not configured")]
    NotConfigured,

    #[error("request failed: {0}")]
    Http(String),

    #[error("backend returned status {0}")]
    Status(u16),

    #[error("backend response undecodable: {0}")]
    Decode(String),

    #[error("backend returned no generations")]
    Empty,
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Http("timed out".to_string())
        } else {
            BackendError::Http(err.to_string())
        }
    }
}

/// Request/response text completion with a configurable deadline.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, BackendError>;
}

#[derive(Clone, Debug, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.7
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    generations: Vec<Generation>,
}

#[derive(Deserialize)]
struct Generation {
    text: String,
}

/// HTTP client for a Cohere-style `/v1/generate` completion endpoint.
pub struct HttpGenerativeBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpGenerativeBackend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        if config.api_key.trim().is_empty() {
            return Err(BackendError::NotConfigured);
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", config.api_key)
                .parse()
                .map_err(|_| BackendError::Decode("invalid api key format".to_string()))?,
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            "application/json".parse().expect("static header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl GenerativeBackend for HttpGenerativeBackend {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, BackendError> {
        let url = format!(
            "{}/v1/generate",
            self.config.base_url.trim_end_matches('/')
        );
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            max_tokens,
            temperature: self.config.temperature,
        };

        debug!(model = %self.config.model, max_tokens, "requesting completion");
        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))?;

        body.generations
            .into_iter()
            .next()
            .map(|g| g.text)
            .ok_or(BackendError::Empty)
    }
}
