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

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::config::FetchConfig;
use crate::error::FetchError;

/// Visible text of a web page
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub title: String,
    pub text: String,
}

/// Turns a URL into page text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Fetches pages over HTTP and strips markup
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let url = validate_url(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("failed to read response body: {}", e)))?;
        debug!(url, bytes = html.len(), "Fetched page");

        parse_page(&html)
    }
}

/// Basic URL validation: trimmed, non-empty, http(s) only
pub fn validate_url(url: &str) -> Result<&str, FetchError> {
    let trimmed = url.trim();
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(FetchError::InvalidUrl);
    }
    Ok(trimmed)
}

/// Extract title and visible text from raw HTML
pub fn parse_page(html: &str) -> Result<FetchedPage, FetchError> {
    let title = extract_title(html);
    let text = html_to_text(html)?;
    Ok(FetchedPage { title, text })
}

/// Render HTML to plain text collapsed to single spaces.
/// html2text parses with html5ever and skips script and style content.
pub fn html_to_text(html: &str) -> Result<String, FetchError> {
    let rendered = html2text::config::plain()
        .string_from_read(html.as_bytes(), 120)
        .map_err(|e| FetchError::Parse(e.to_string()))?;
    Ok(collapse_whitespace(&rendered))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract title from HTML: `<title>`, then the first `<h1>`, then "Untitled"
pub fn extract_title(html: &str) -> String {
    let lower = html.to_ascii_lowercase();

    // Try <title> tag first
    if let Some(start) = lower.find("<title") {
        if let Some(content_start) = lower[start..].find('>') {
            let content_start = start + content_start + 1;
            if let Some(end) = lower[content_start..].find("</title>") {
                if let Some(title) = fragment_text(&html[content_start..content_start + end]) {
                    return title;
                }
            }
        }
    }

    // Fallback to first <h1>
    if let Some(start) = lower.find("<h1") {
        if let Some(content_start) = lower[start..].find('>') {
            let content_start = start + content_start + 1;
            if let Some(end) = lower[content_start..].find("</h1>") {
                if let Some(title) = fragment_text(&html[content_start..content_start + end]) {
                    return title;
                }
            }
        }
    }

    "Untitled".to_string()
}

fn fragment_text(fragment: &str) -> Option<String> {
    let text = html_to_text(fragment).ok()?;
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
