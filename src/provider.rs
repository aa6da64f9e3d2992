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

use anyhow::Result;
use std::fmt;

/// Remote model providers reachable over HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Ollama,
    Anthropic,
}

impl Provider {
    pub fn from_str_loose(s: &str) -> Option<Provider> {
        match s.to_lowercase().as_str() {
            "openai" | "gpt" => Some(Provider::OpenAI),
            "ollama" | "local" => Some(Provider::Ollama),
            "anthropic" | "claude" => Some(Provider::Anthropic),
            _ => None,
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Ollama => "http://localhost:11434",
            Provider::Anthropic => "https://api.anthropic.com",
        }
    }

    /// Environment variable holding the API key, if the provider needs one
    pub fn env_var_name(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAI => Some("OPENAI_API_KEY"),
            Provider::Anthropic => Some("ANTHROPIC_API_KEY"),
            Provider::Ollama => None,
        }
    }

    pub fn supports_embeddings(&self) -> bool {
        !matches!(self, Provider::Anthropic)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAI => write!(f, "openai"),
            Provider::Ollama => write!(f, "ollama"),
            Provider::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Split a `provider:model` string. A bare model name means OpenAI.
/// Only the first colon separates, so Ollama tags like `llama3:8b` survive
/// as `ollama:llama3:8b`.
pub fn parse_provider_model(spec: &str) -> Result<(Provider, String)> {
    let spec = spec.trim();
    if spec.is_empty() {
        anyhow::bail!("Model cannot be empty");
    }

    let (provider, model) = match spec.split_once(':') {
        Some((prefix, rest)) => match Provider::from_str_loose(prefix) {
            Some(provider) => (provider, rest.trim()),
            None => anyhow::bail!(
                "Unknown provider '{}' in model '{}' (expected openai, ollama or anthropic)",
                prefix,
                spec
            ),
        },
        None => (Provider::OpenAI, spec),
    };

    if model.is_empty() {
        anyhow::bail!("Model name missing after provider in '{}'", spec);
    }

    Ok((provider, model.to_string()))
}

/// Everything needed to talk to one provider endpoint
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub provider: Provider,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// Resolve model string, endpoint override and API key from the environment
pub fn resolve(model_spec: &str, endpoint: Option<&str>) -> Result<ResolvedProvider> {
    let (provider, model) = parse_provider_model(model_spec)?;

    let api_key = provider
        .env_var_name()
        .and_then(|name| std::env::var(name).ok())
        .filter(|key| !key.trim().is_empty());

    if let (Some(name), None) = (provider.env_var_name(), &api_key) {
        anyhow::bail!(
            "No API key found for {}. Set {} in the environment or a .env file",
            provider,
            name
        );
    }

    let endpoint = endpoint
        .map(|e| e.trim().trim_end_matches('/').to_string())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| provider.default_endpoint().to_string());

    Ok(ResolvedProvider {
        provider,
        endpoint,
        model,
        api_key,
    })
}
