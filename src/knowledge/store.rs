use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::embedding::{Embedding, EmbeddingProvider};
use crate::error::QaError;
use crate::fetch::{FetchedPage, PageFetcher};
use crate::knowledge::chunker::TextChunker;
use crate::knowledge::ranker;
use crate::knowledge::types::ScoredChunk;

/// Chunks and their embeddings for one processed URL.
/// `chunks[i]` is embedded by `embeddings[i]`; all embeddings share one dimension.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    url: String,
    title: String,
    content_hash: String,
    chunks: Vec<String>,
    embeddings: Vec<Embedding>,
    dimension: usize,
    built_at: DateTime<Utc>,
}

impl KnowledgeBase {
    /// Fetch, chunk and embed a page.
    /// Nothing is returned unless every chunk was embedded.
    pub async fn build(
        url: &str,
        fetcher: &dyn PageFetcher,
        chunker: &TextChunker,
        embedder: &dyn EmbeddingProvider,
        concurrency: usize,
    ) -> Result<Self, QaError> {
        let page = fetcher
            .fetch(url)
            .await
            .map_err(|e| QaError::fetch(url, e))?;

        let chunks = chunker.split(&page.text);
        debug!(
            url,
            chunks = chunks.len(),
            max_chunk_size = chunker.max_chunk_size(),
            "Chunked page text"
        );

        let embeddings = crate::embedding::generate_embeddings(&chunks, embedder, concurrency)
            .await
            .map_err(QaError::embedding)?;

        let kb = Self::from_parts(url, &page, chunks, embeddings)?;

        info!(
            url,
            chunks = kb.len(),
            dimension = kb.dimension,
            model = embedder.model_name(),
            "Knowledge base built"
        );

        Ok(kb)
    }

    /// Assemble a knowledge base for `page` from precomputed chunks and embeddings
    pub fn from_parts(
        url: &str,
        page: &FetchedPage,
        chunks: Vec<String>,
        embeddings: Vec<Embedding>,
    ) -> Result<Self, QaError> {
        if chunks.len() != embeddings.len() {
            return Err(QaError::Embedding(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings.first().map(|e| e.len()).unwrap_or(0);
        for (index, embedding) in embeddings.iter().enumerate() {
            if embedding.is_empty() {
                return Err(QaError::Embedding(format!(
                    "chunk {} has an empty embedding",
                    index
                )));
            }
            if embedding.len() != dimension {
                return Err(QaError::Embedding(format!(
                    "chunk {} has dimension {}, expected {}",
                    index,
                    embedding.len(),
                    dimension
                )));
            }
        }

        Ok(Self {
            url: url.to_string(),
            title: page.title.clone(),
            content_hash: compute_hash(&page.text),
            chunks,
            embeddings,
            dimension,
            built_at: Utc::now(),
        })
    }

    /// The `k` chunks most similar to the query vector, best first
    pub fn retrieve(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, QaError> {
        if self.chunks.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(QaError::Embedding(format!(
                "question embedding has dimension {}, knowledge base uses {}",
                query.len(),
                self.dimension
            )));
        }

        Ok(ranker::rank(query, &self.embeddings)
            .into_iter()
            .take(k.min(self.chunks.len()))
            .map(|scored| ScoredChunk {
                index: scored.index,
                score: scored.score,
                text: self.chunks[scored.index].clone(),
            })
            .collect())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// SHA-256 of the extracted page text
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn embeddings(&self) -> &[Embedding] {
        &self.embeddings
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
