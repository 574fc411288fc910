//! Client for OpenAI-compatible `/embeddings` endpoints.

use std::time::Duration;

use anyhow::{anyhow, Context};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use paperdex_core::config::EmbeddingConfig;
use paperdex_core::traits::Embedder;
use paperdex_core::{Error, Result};

pub struct OpenAiEmbedder {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

impl OpenAiEmbedder {
    /// Reads the API key from the variable named by `api_key_env`.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| Error::config(format!("environment variable {} is not set", config.api_key_env)))?;
        Self::new(&config.base_url, &config.model, api_key, Duration::from_secs(config.timeout_secs))
    }

    pub fn new(base_url: &str, model: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::embedding("build http client", e.into()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }
}

impl Embedder for OpenAiEmbedder {
    fn model_id(&self) -> &str { &self.model }

    fn embed_documents(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/embeddings", self.base_url);
        tracing::debug!(model = %self.model, inputs = texts.len(), "requesting embeddings");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": self.model, "input": texts }))
            .send()
            .with_context(|| format!("failed to reach {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("embedding API error {status}: {body}"));
        }
        let parsed: EmbeddingsResponse = response.json().context("failed to parse embeddings response")?;
        if parsed.data.len() != texts.len() {
            return Err(anyhow!("expected {} embeddings, got {}", texts.len(), parsed.data.len()));
        }
        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}
