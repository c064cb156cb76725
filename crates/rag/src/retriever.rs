//! Similarity retrieval over the loaded index.

use crate::embeddings::EmbeddingProvider;
use crate::index::{self, LoadedIndex};
use crate::types::RetrievedPassage;
use poliqa_core::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;

/// Read-only retriever over a loaded index.
///
/// Holds the index rows in memory in insertion order; the structure never
/// mutates after `load`, so it is safe to share across concurrent queries.
#[derive(Debug)]
pub struct Retriever {
    index: LoadedIndex,
    provider: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    /// Load the persisted index and bind it to the active embedding
    /// provider.
    ///
    /// Fails with `IndexMissing` when no artifact exists and with
    /// `IndexIncompatible` when the artifact was built under a different
    /// embedding configuration.
    pub fn load(index_path: &Path, provider: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        let index = index::load_index(index_path)?;
        index::verify_compatibility(&index.manifest, provider.as_ref())?;
        Ok(Self { index, provider })
    }

    /// Number of chunks in the index.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Return the `k` chunks most similar to `question`, ordered by
    /// increasing cosine distance. Ties keep index insertion order. A `k`
    /// larger than the index returns all available chunks.
    pub async fn search(&self, question: &str, k: usize) -> AppResult<Vec<RetrievedPassage>> {
        let query = self.provider.embed(question).await?;

        if query.len() != self.index.manifest.dimensions {
            return Err(AppError::IndexIncompatible(format!(
                "query embedding has {} dimensions but the index holds {}-dimensional vectors",
                query.len(),
                self.index.manifest.dimensions
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .index
            .rows
            .iter()
            .enumerate()
            .map(|(position, (embedding, _))| (position, cosine_distance(&query, embedding)))
            .collect();

        // Stable sort: equal distances keep insertion order.
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        let passages: Vec<RetrievedPassage> = scored
            .into_iter()
            .enumerate()
            .map(|(rank, (position, distance))| RetrievedPassage {
                chunk: self.index.rows[position].1.clone(),
                rank,
                distance,
            })
            .collect();

        tracing::debug!(
            "Retrieved {} passages (requested top-{}) for query",
            passages.len(),
            k
        );

        Ok(passages)
    }
}

/// Cosine distance: 1 − cosine similarity. Lower is more similar.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
