/// Splits page text into word-aligned chunks of roughly `max_chunk_size` characters
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_chunk_size: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(500)
    }
}

impl TextChunker {
    pub fn new(max_chunk_size: usize) -> Self {
        Self {
            max_chunk_size: max_chunk_size.max(1),
        }
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Split text on whitespace and regroup the words.
    /// Every word counts its length plus one separator; a chunk closes as soon as
    /// the running total reaches the bound, so words are never cut.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_length = 0;

        for word in text.split_whitespace() {
            current.push(word);
            current_length += word.chars().count() + 1;

            if current_length >= self.max_chunk_size {
                chunks.push(current.join(" "));
                current.clear();
                current_length = 0;
            }
        }

        if !current.is_empty() {
            chunks.push(current.join(" "));
        }

        chunks
    }
}
