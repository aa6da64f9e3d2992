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
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::GenerationConfig;
use crate::provider::{self, Provider, ResolvedProvider};

/// One completion call: system instruction, user prompt and sampling limits
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Produces answer text from a prompt
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    fn model_name(&self) -> &str;
}

pub fn create_answer_generator(config: &GenerationConfig) -> Result<Arc<dyn AnswerGenerator>> {
    let resolved = provider::resolve(&config.model, config.endpoint.as_deref())?;
    Ok(Arc::new(HttpAnswerGenerator::new(
        resolved,
        Duration::from_secs(config.timeout_secs),
    )?))
}

/// Chat completion client for OpenAI-compatible and Anthropic APIs
pub struct HttpAnswerGenerator {
    resolved: ResolvedProvider,
    client: reqwest::Client,
}

impl HttpAnswerGenerator {
    pub fn new(resolved: ResolvedProvider, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { resolved, client })
    }

    async fn post(&self, url: &str, body: serde_json::Value) -> Result<String> {
        let mut req = self.client.post(url).json(&body);
        if let Some(ref key) = self.resolved.api_key {
            req = match self.resolved.provider {
                Provider::Anthropic => req
                    .header("x-api-key", key)
                    .header("anthropic-version", ANTHROPIC_VERSION),
                Provider::OpenAI | Provider::Ollama => req.bearer_auth(key),
            };
        }

        let response = req
            .send()
            .await
            .with_context(|| format!("{} completion request failed", self.resolved.provider))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM returned {}: {}", status, text);
        }
        response
            .text()
            .await
            .context("Failed to read completion response")
    }
}

#[async_trait]
impl AnswerGenerator for HttpAnswerGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let url = completion_url(self.resolved.provider, &self.resolved.endpoint);
        let body = completion_body(self.resolved.provider, &self.resolved.model, request);
        let response = self.post(&url, body).await?;

        match self.resolved.provider {
            Provider::Anthropic => parse_anthropic_completion(&response),
            Provider::OpenAI | Provider::Ollama => parse_chat_completion(&response),
        }
    }

    fn model_name(&self) -> &str {
        &self.resolved.model
    }
}

const ANTHROPIC_VERSION: &str = "2023-06-01";

fn completion_url(provider: Provider, endpoint: &str) -> String {
    match provider {
        Provider::Anthropic => format!("{}/v1/messages", endpoint),
        // Ollama serves the OpenAI-compatible API under /v1
        Provider::Ollama => format!("{}/v1/chat/completions", endpoint),
        Provider::OpenAI => format!("{}/chat/completions", endpoint),
    }
}

fn completion_body(
    provider: Provider,
    model: &str,
    request: &CompletionRequest,
) -> serde_json::Value {
    match provider {
        Provider::Anthropic => serde_json::json!({
            "model": model,
            "max_tokens": request.max_tokens,
            "system": request.system,
            "messages": [
                { "role": "user", "content": request.prompt },
            ],
            "temperature": request.temperature,
        }),
        Provider::OpenAI | Provider::Ollama => serde_json::json!({
            "model": model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt },
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        }),
    }
}

/// Text of the first content block of a Messages API response
fn parse_anthropic_completion(body: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct MessagesResponse {
        #[serde(default)]
        content: Vec<ContentBlock>,
    }

    #[derive(Deserialize)]
    struct ContentBlock {
        text: Option<String>,
    }

    let response: MessagesResponse =
        serde_json::from_str(body).context("Invalid Anthropic response")?;
    response
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or_else(|| anyhow::anyhow!("LLM returned empty response"))
}

/// `choices[0].message.content` of a chat completion response
fn parse_chat_completion(body: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct ChatResponse {
        #[serde(default)]
        choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    struct Choice {
        message: Message,
    }

    #[derive(Deserialize)]
    struct Message {
        content: Option<String>,
    }

    let response: ChatResponse =
        serde_json::from_str(body).context("Invalid chat completion response")?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| anyhow::anyhow!("LLM returned empty response"))
}
