//! OpenAI-compatible embedding client

use crate::config::EmbeddingConfig;
use crate::embedding::Embedder;
use crate::CrawlerError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Attempts per batch before giving up on 429/5xx or transient network errors
const MAX_ATTEMPTS: usize = 3;

/// Embeddings client that talks to OpenAI-compatible `/embeddings` endpoints
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    batch_size: usize,
    backoff_base: Duration,
}

impl OpenAiEmbedder {
    /// Builds a new client
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        batch_size: usize,
        timeout: Duration,
    ) -> Result<Self, CrawlerError> {
        if api_key.trim().is_empty() {
            return Err(CrawlerError::Embedding("missing API key".to_string()));
        }

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|_| CrawlerError::Embedding("invalid API key".to_string()))?;
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
            batch_size: batch_size.max(1),
            backoff_base: Duration::from_millis(500),
        })
    }

    /// Builds a client from configuration, reading the key from the configured variable
    pub fn from_config(config: &EmbeddingConfig, timeout: Duration) -> Result<Self, CrawlerError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            CrawlerError::Embedding(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        Self::new(
            &api_key,
            &config.endpoint,
            &config.model,
            config.batch_size,
            timeout,
        )
    }

    /// Overrides the base delay between retries
    pub fn with_backoff(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// Maximum batch size configured for this client
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn retry_backoff(&self, attempt: usize) -> Duration {
        self.backoff_base * (1u32 << attempt.min(5))
    }
}

impl Embedder for OpenAiEmbedder {
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, CrawlerError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        if inputs.len() > self.batch_size {
            return Err(CrawlerError::Embedding(format!(
                "batch of {} exceeds configured max {}",
                inputs.len(),
                self.batch_size
            )));
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };

        let mut attempt = 0usize;
        loop {
            attempt += 1;
            let response = match self.client.post(&self.endpoint).json(&request).send().await {
                Ok(response) => response,
                Err(e) if is_retryable_error(&e) && attempt < MAX_ATTEMPTS => {
                    tracing::warn!("Embedding request failed (attempt {}): {}", attempt, e);
                    tokio::time::sleep(self.retry_backoff(attempt)).await;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();
            if status.is_success() {
                let mut parsed: EmbeddingResponse = response.json().await?;
                parsed.data.sort_by_key(|entry| entry.index);
                if parsed.data.len() != inputs.len() {
                    return Err(CrawlerError::Embedding(format!(
                        "endpoint returned {} embeddings for {} inputs",
                        parsed.data.len(),
                        inputs.len()
                    )));
                }
                return Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect());
            }

            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            if should_retry(status) && attempt < MAX_ATTEMPTS {
                tracing::warn!("Embedding endpoint returned {} (attempt {})", status, attempt);
                tokio::time::sleep(self.retry_backoff(attempt)).await;
                continue;
            }
            return Err(CrawlerError::Embedding(format!(
                "embeddings request failed ({}): {}",
                status, body
            )));
        }
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}
