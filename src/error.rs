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

use std::fmt;

use thiserror::Error;

/// Which piece of user input was rejected as blank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Url,
    Question,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Url => write!(f, "URL"),
            InputKind::Question => write!(f, "Question"),
        }
    }
}

/// Reasons a page could not be turned into text
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL: must start with http:// or https://")]
    InvalidUrl,

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("could not extract text: {0}")]
    Parse(String),
}

/// Errors surfaced by the retrieval core
#[derive(Error, Debug)]
pub enum QaError {
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("{0} cannot be empty")]
    EmptyInput(InputKind),

    #[error("No website processed yet. Process a URL before asking questions.")]
    NotReady,

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

impl QaError {
    pub fn fetch(url: &str, source: FetchError) -> Self {
        QaError::Fetch {
            url: url.to_string(),
            source,
        }
    }

    /// Wrap a provider error, keeping its context chain in the message
    pub fn embedding(err: anyhow::Error) -> Self {
        QaError::Embedding(format!("{:#}", err))
    }

    pub fn generation(err: anyhow::Error) -> Self {
        QaError::Generation(format!("{:#}", err))
    }
}
