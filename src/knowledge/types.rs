use chrono::{DateTime, Utc};
use std::time::Duration;

/// Who produced a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Bot => write!(f, "bot"),
        }
    }
}

/// One message in the conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// A retrieved chunk with its similarity to the question
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub index: usize,
    pub score: f32,
    pub text: String,
}

/// Outcome of processing a URL into a knowledge base
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub url: String,
    pub title: String,
    pub chunk_count: usize,
    pub elapsed: Duration,
}
