//! Page knowledge base and the question-answering session built on it

pub mod chunker;
pub mod formatting;
pub mod ranker;
pub mod session;
pub mod store;
pub mod types;

#[cfg(test)]
mod session_tests;
#[cfg(test)]
mod test_support;

pub use chunker::TextChunker;
pub use session::QuerySession;
