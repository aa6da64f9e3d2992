use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::constants::{CONTEXT_SEPARATOR, ERROR_ANSWER_PREFIX, NO_CONTENT_ANSWER, SYSTEM_PROMPT};
use crate::embedding::EmbeddingProvider;
use crate::error::{InputKind, QaError};
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::generation::{AnswerGenerator, CompletionRequest};
use crate::knowledge::chunker::TextChunker;
use crate::knowledge::store::KnowledgeBase;
use crate::knowledge::types::{ChatTurn, ProcessResult, ScoredChunk};

/// Tunables for one session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub max_chunk_size: usize,
    pub top_k: usize,
    pub max_tokens: u32,
    pub temperature: f32,
    pub embedding_concurrency: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_chunk_size: 500,
            top_k: 3,
            max_tokens: 300,
            temperature: 0.7,
            embedding_concurrency: 1,
        }
    }
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_chunk_size: config.chunking.max_chunk_size,
            top_k: config.search.top_k,
            max_tokens: config.generation.max_tokens,
            temperature: config.generation.temperature,
            embedding_concurrency: config.embedding.concurrency,
        }
    }
}

/// One user's knowledge base plus the conversation about it.
///
/// `process` swaps in a new knowledge base and starts a fresh conversation;
/// `ask` answers from the current one. Failed operations never leave the
/// session half-updated.
pub struct QuerySession {
    fetcher: Arc<dyn PageFetcher>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn AnswerGenerator>,
    chunker: TextChunker,
    settings: SessionSettings,
    knowledge: Option<KnowledgeBase>,
    history: Vec<ChatTurn>,
    last_sources: Vec<ScoredChunk>,
    last_process: Option<ProcessResult>,
}

impl QuerySession {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn AnswerGenerator>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            fetcher,
            embedder,
            generator,
            chunker: TextChunker::new(settings.max_chunk_size),
            settings,
            knowledge: None,
            history: Vec::new(),
            last_sources: Vec::new(),
            last_process: None,
        }
    }

    /// Session wired to the HTTP fetcher and the configured model providers
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
        let embedder = crate::embedding::create_embedding_provider(&config.embedding)?;
        let generator = crate::generation::create_answer_generator(&config.generation)?;

        Ok(Self::new(
            fetcher,
            embedder,
            generator,
            SessionSettings::from_config(config),
        ))
    }

    /// Build a knowledge base for `url` and make it current.
    /// On success the conversation is reset; on failure nothing changes.
    pub async fn process(&mut self, url: &str) -> Result<ProcessResult, QaError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(QaError::EmptyInput(InputKind::Url));
        }

        info!(url, "Processing website");
        let started = Instant::now();

        let built = KnowledgeBase::build(
            url,
            self.fetcher.as_ref(),
            &self.chunker,
            self.embedder.as_ref(),
            self.settings.embedding_concurrency,
        )
        .await;

        let kb = match built {
            Ok(kb) => kb,
            Err(e) => {
                warn!(url, error = %e, "Processing failed, keeping previous knowledge base");
                return Err(e);
            }
        };

        let result = ProcessResult {
            url: url.to_string(),
            title: kb.title().to_string(),
            chunk_count: kb.len(),
            elapsed: started.elapsed(),
        };

        info!(
            url,
            chunks = result.chunk_count,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Website processed"
        );

        self.knowledge = Some(kb);
        self.history.clear();
        self.last_sources.clear();
        self.last_process = Some(result.clone());

        Ok(result)
    }

    /// Answer a question from the current knowledge base.
    ///
    /// Missing knowledge base and blank questions are rejected without touching
    /// the history. Every accepted question appends exactly one user turn and
    /// one bot turn; if answering fails the bot turn carries the error text and
    /// the error is returned as well.
    pub async fn ask(&mut self, question: &str) -> Result<String, QaError> {
        let kb = self.knowledge.as_ref().ok_or(QaError::NotReady)?;

        let question = question.trim();
        if question.is_empty() {
            return Err(QaError::EmptyInput(InputKind::Question));
        }

        let outcome = self.answer(kb, question).await;
        match outcome {
            Ok((answer, sources)) => {
                self.last_sources = sources;
                self.record_exchange(question, answer.clone());
                Ok(answer)
            }
            Err(e) => {
                warn!(error = %e, "Failed to answer question");
                self.last_sources.clear();
                self.record_exchange(question, format!("{} {}", ERROR_ANSWER_PREFIX, e));
                Err(e)
            }
        }
    }

    async fn answer(
        &self,
        kb: &KnowledgeBase,
        question: &str,
    ) -> Result<(String, Vec<ScoredChunk>), QaError> {
        if kb.is_empty() {
            return Ok((NO_CONTENT_ANSWER.to_string(), Vec::new()));
        }

        let started = Instant::now();

        let query_embedding = self
            .embedder
            .embed(question)
            .await
            .map_err(QaError::embedding)?;

        let sources = kb.retrieve(&query_embedding, self.settings.top_k)?;
        debug!(
            selected = ?sources.iter().map(|s| s.index).collect::<Vec<_>>(),
            "Retrieved context chunks"
        );

        let context = sources
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        let request = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(&context, question),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let answer = self
            .generator
            .complete(&request)
            .await
            .map_err(QaError::generation)?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(QaError::Generation(
                "model returned an empty answer".to_string(),
            ));
        }

        info!(
            url = kb.url(),
            chunks_used = sources.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            model = self.generator.model_name(),
            "Question answered"
        );

        Ok((answer.to_string(), sources))
    }

    /// Both turns are pushed together once the outcome is known
    fn record_exchange(&mut self, question: &str, answer: String) {
        self.history.reserve(2);
        self.history.push(ChatTurn::user(question));
        self.history.push(ChatTurn::bot(answer));
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.last_sources.clear();
    }

    pub fn set_top_k(&mut self, top_k: usize) -> Result<(), QaError> {
        if top_k == 0 {
            return Err(QaError::InvalidSetting(
                "top_k must be at least 1".to_string(),
            ));
        }
        self.settings.top_k = top_k;
        Ok(())
    }

    pub fn top_k(&self) -> usize {
        self.settings.top_k
    }

    pub fn is_ready(&self) -> bool {
        self.knowledge.is_some()
    }

    pub fn knowledge_base(&self) -> Option<&KnowledgeBase> {
        self.knowledge.as_ref()
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Chunks used for the most recent successful answer
    pub fn last_sources(&self) -> &[ScoredChunk] {
        &self.last_sources
    }

    pub fn last_process(&self) -> Option<&ProcessResult> {
        self.last_process.as_ref()
    }
}

/// Prompt asking the model to answer strictly from the retrieved context
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Answer the following question based only on the context below.\n\n\
         Context:\n{}\n\n\
         Question: {}\nAnswer:",
        context, question
    )
}
