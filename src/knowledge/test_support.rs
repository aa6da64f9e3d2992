//! Deterministic stand-ins for the page fetcher and model providers

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::embedding::{Embedding, EmbeddingProvider};
use crate::error::FetchError;
use crate::fetch::{FetchedPage, PageFetcher};
use crate::generation::{AnswerGenerator, CompletionRequest};

pub const FOX_PAGE_URL: &str = "https://animals.example/foxes";

/// Serves pages from memory; unknown URLs fail like an unreachable host
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, FetchedPage>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, title: &str, text: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchedPage {
                title: title.to_string(),
                text: text.to_string(),
            },
        );
        self
    }

    pub fn with_fox_page() -> Self {
        Self::new().with_page(FOX_PAGE_URL, "Animals", &Self::fox_text())
    }

    pub fn fox_text() -> String {
        [
            "Foxes are small omnivorous mammals that live in forests.",
            "The red fox is the largest of the true foxes.",
            "Our shop opens at nine and closes at five on weekdays.",
            "Opening hours on weekends are shorter.",
            "Tickets cost ten dollars for adults and the price for children is five dollars.",
            "A lazy dog sleeps all day in the sun.",
        ]
        .join(" ")
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Network("connection refused".to_string()))
    }
}

/// Bag-of-keywords embedder: one dimension per topic
pub struct KeywordEmbedder {
    calls: AtomicUsize,
    fail_when_contains: Option<String>,
}

impl KeywordEmbedder {
    pub const DIMENSION: usize = 4;

    const TOPICS: [&'static [&'static str]; 4] = [
        &["fox"],
        &["hours", "open", "close"],
        &["price", "cost", "dollar"],
        &["dog", "lazy"],
    ];

    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_when_contains: None,
        }
    }

    pub fn failing_on(word: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_when_contains: Some(word.to_lowercase()),
        }
    }

    pub fn vector_for(text: &str) -> Embedding {
        let lower = text.to_lowercase();
        Self::TOPICS
            .iter()
            .map(|keywords| {
                keywords
                    .iter()
                    .map(|k| lower.matches(k).count())
                    .sum::<usize>() as f32
            })
            .collect()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref word) = self.fail_when_contains {
            if text.to_lowercase().contains(word.as_str()) {
                anyhow::bail!("rate limit exceeded");
            }
        }
        Ok(Self::vector_for(text))
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}

/// Returns scripted answers and records every request
pub struct CannedGenerator {
    replies: Mutex<Vec<Result<String, String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl CannedGenerator {
    /// Always answers with `answer`
    pub fn answering(answer: &str) -> Self {
        Self::scripted(vec![Ok(answer.to_string())])
    }

    /// Replies are consumed in order; the last one repeats
    pub fn scripted(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerGenerator for CannedGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());

        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.len() > 1 {
            replies.remove(0)
        } else {
            replies
                .first()
                .cloned()
                .unwrap_or_else(|| Ok(String::new()))
        };

        reply.map_err(|e| anyhow::anyhow!(e))
    }

    fn model_name(&self) -> &str {
        "canned-test"
    }
}
