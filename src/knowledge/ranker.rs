use std::cmp::Ordering;

/// Similarity of one chunk to a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredIndex {
    pub index: usize,
    pub score: f32,
}

/// Cosine similarity between two vectors.
/// Zero-norm vectors, mismatched lengths and non-finite results score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    let similarity = dot_product / (magnitude_a * magnitude_b);
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}

/// Score every embedding against the query, best first.
/// Equal scores keep chunk order so the output is fully deterministic.
pub fn rank<E: AsRef<[f32]>>(query: &[f32], embeddings: &[E]) -> Vec<ScoredIndex> {
    let mut scored: Vec<ScoredIndex> = embeddings
        .iter()
        .enumerate()
        .map(|(index, embedding)| ScoredIndex {
            index,
            score: cosine_similarity(query, embedding.as_ref()),
        })
        .collect();

    // Scores are always finite here, and -0.0 must tie with 0.0
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.index.cmp(&b.index))
    });

    scored
}

/// Indices of the `k` most similar embeddings, highest similarity first
pub fn top_k<E: AsRef<[f32]>>(query: &[f32], embeddings: &[E], k: usize) -> Vec<usize> {
    rank(query, embeddings)
        .into_iter()
        .take(k.min(embeddings.len()))
        .map(|scored| scored.index)
        .collect()
}
