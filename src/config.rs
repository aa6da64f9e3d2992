// Copyright 2025 Muvon Un Limited
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
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_TEMPLATE: &str = include_str!("../config-templates/default.toml");

/// Page fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "WebFaq/1.0".to_string(),
        }
    }
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Approximate chunk bound in characters
    pub max_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 500,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Model in `provider:model` form
    pub model: String,
    /// Overrides the provider's default base URL when set
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    /// Number of chunk embedding requests allowed in flight at once
    pub concurrency: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "openai:text-embedding-3-small".to_string(),
            endpoint: None,
            timeout_secs: 60,
            concurrency: 1,
        }
    }
}

/// Answer generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    pub endpoint: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "openai:gpt-4o-mini".to_string(),
            endpoint: None,
            max_tokens: 300,
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// How many chunks are used as context for each answer
    pub top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is not set
    pub level: String,
    /// Also write JSON logs to the data directory
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "webfaq=warn".to_string(),
            file: false,
        }
    }
}

/// Main configuration for webfaq
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from config.toml file
    /// First tries the explicit path, then the system config directory,
    /// falling back to the embedded template (which is written out for next time)
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            return Self::from_toml_str(&content)
                .with_context(|| format!("Invalid config file {}", path.display()));
        }

        let config_path = crate::storage::get_system_config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml_str(&content)
                .with_context(|| format!("Invalid config file {}", config_path.display()))
        } else {
            let config = Self::from_toml_str(DEFAULT_TEMPLATE)?;

            if let Some(parent) = config_path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&config_path, DEFAULT_TEMPLATE)?;

            Ok(config)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Where `load(None)` reads from
    pub fn default_path() -> Result<PathBuf> {
        crate::storage::get_system_config_path()
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.max_chunk_size == 0 {
            anyhow::bail!("chunking.max_chunk_size must be at least 1");
        }
        if self.search.top_k == 0 {
            anyhow::bail!("search.top_k must be at least 1");
        }
        if self.embedding.concurrency == 0 {
            anyhow::bail!("embedding.concurrency must be at least 1");
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            anyhow::bail!(
                "generation.temperature must be between 0.0 and 2.0, got {}",
                self.generation.temperature
            );
        }
        if self.generation.max_tokens == 0 {
            anyhow::bail!("generation.max_tokens must be at least 1");
        }
        Ok(())
    }

    /// Apply command line overrides on top of the file values
    pub fn with_overrides(mut self, top_k: Option<usize>, chunk_size: Option<usize>) -> Result<Self> {
        if let Some(k) = top_k {
            self.search.top_k = k;
        }
        if let Some(size) = chunk_size {
            self.chunking.max_chunk_size = size;
        }
        self.validate()?;
        Ok(self)
    }
}
