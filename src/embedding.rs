// Copyright 2026 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::EmbeddingConfig;
use crate::provider::{self, Provider, ResolvedProvider};

/// A fixed-length vector representation of a piece of text
pub type Embedding = Vec<f32>;

/// Maps text to an embedding vector.
/// All vectors from one provider instance must share the same dimensionality.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Identifier of the underlying model, for logs and stats
    fn model_name(&self) -> &str;
}

/// Create embedding provider from config
pub fn create_embedding_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let resolved = provider::resolve(&config.model, config.endpoint.as_deref())?;
    if !resolved.provider.supports_embeddings() {
        anyhow::bail!(
            "Provider {} does not offer embeddings; choose openai or ollama for embedding.model",
            resolved.provider
        );
    }
    Ok(Arc::new(HttpEmbeddingProvider::new(
        resolved,
        Duration::from_secs(config.timeout_secs),
    )?))
}

/// Embed texts in input order with at most `concurrency` requests in flight.
/// The first failure (in input order) aborts the whole batch.
pub async fn generate_embeddings(
    texts: &[String],
    provider: &dyn EmbeddingProvider,
    concurrency: usize,
) -> Result<Vec<Embedding>> {
    stream::iter(texts.iter().enumerate())
        .map(|(index, text)| async move {
            debug!(chunk = index, chars = text.chars().count(), "Requesting embedding");
            provider
                .embed(text)
                .await
                .with_context(|| format!("chunk {}", index))
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

/// Embedding provider backed by the OpenAI or Ollama HTTP API
pub struct HttpEmbeddingProvider {
    resolved: ResolvedProvider,
    client: reqwest::Client,
}

impl HttpEmbeddingProvider {
    pub fn new(resolved: ResolvedProvider, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { resolved, client })
    }

    async fn post(&self, url: &str, body: serde_json::Value) -> Result<String> {
        let mut request = self.client.post(url).json(&body);
        if let Some(ref key) = self.resolved.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("{} embeddings request failed", self.resolved.provider))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("{} API returned {}: {}", self.resolved.provider, status, text);
        }
        response
            .text()
            .await
            .context("Failed to read embedding response")
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let url = embeddings_url(self.resolved.provider, &self.resolved.endpoint)?;
        match self.resolved.provider {
            Provider::OpenAI => {
                let body = self
                    .post(
                        &url,
                        serde_json::json!({ "model": self.resolved.model, "input": text }),
                    )
                    .await?;
                parse_openai_embedding(&body)
            }
            Provider::Ollama => {
                let body = self
                    .post(
                        &url,
                        serde_json::json!({ "model": self.resolved.model, "prompt": text }),
                    )
                    .await?;
                parse_ollama_embedding(&body)
            }
            Provider::Anthropic => anyhow::bail!("Anthropic does not provide embeddings"),
        }
    }

    fn model_name(&self) -> &str {
        &self.resolved.model
    }
}

/// Embeddings endpoint for a provider base URL
fn embeddings_url(provider: Provider, endpoint: &str) -> Result<String> {
    match provider {
        Provider::OpenAI => Ok(format!("{}/embeddings", endpoint)),
        Provider::Ollama => Ok(format!("{}/api/embeddings", endpoint)),
        Provider::Anthropic => anyhow::bail!("Anthropic does not provide embeddings"),
    }
}

/// `{"data": [{"embedding": [...]}, ...]}`, first entry wins
fn parse_openai_embedding(body: &str) -> Result<Embedding> {
    #[derive(Deserialize)]
    struct EmbeddingResponse {
        data: Vec<EmbeddingData>,
    }

    #[derive(Deserialize)]
    struct EmbeddingData {
        embedding: Vec<f32>,
    }

    let response: EmbeddingResponse =
        serde_json::from_str(body).context("Invalid OpenAI embedding response")?;

    let embedding = response
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| anyhow::anyhow!("OpenAI returned no embedding"))?;
    non_empty(embedding, Provider::OpenAI)
}

/// `{"embedding": [...]}`
fn parse_ollama_embedding(body: &str) -> Result<Embedding> {
    #[derive(Deserialize)]
    struct EmbeddingResponse {
        embedding: Vec<f32>,
    }

    let response: EmbeddingResponse =
        serde_json::from_str(body).context("Invalid Ollama embedding response")?;
    non_empty(response.embedding, Provider::Ollama)
}

fn non_empty(embedding: Embedding, provider: Provider) -> Result<Embedding> {
    if embedding.is_empty() {
        anyhow::bail!("{} returned an empty embedding", provider);
    }
    Ok(embedding)
}
