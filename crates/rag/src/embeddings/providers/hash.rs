//! Deterministic local embedding provider.
//!
//! Generates content-aware vectors from character trigrams and word
//! frequencies. Not semantically accurate like a neural model, but
//! deterministic for a given model identifier, which makes it suitable
//! for tests and offline runs.

use crate::embeddings::provider::EmbeddingProvider;
use poliqa_core::AppResult;

/// Local trigram/word-hash embedding provider.
#[derive(Debug)]
pub struct HashProvider {
    model: String,
    dimensions: usize,
}

impl HashProvider {
    /// Create a new hash provider with the given model tag and dimensions.
    pub fn new(model: String, dimensions: usize) -> Self {
        Self { model, dimensions }
    }

    /// Generate an embedding from trigram and word hashes.
    fn generate_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];

        let lower = text.to_lowercase();

        // Filter stop words for better discrimination
        let stop_words: std::collections::HashSet<&str> = [
            "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to",
            "of", "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have",
            "has", "had", "it", "its", "their", "they", "them",
        ]
        .iter()
        .copied()
        .collect();

        let words: Vec<&str> = lower
            .split_whitespace()
            .filter(|w| !stop_words.contains(w) && w.len() > 2)
            .collect();

        let mut word_freq = std::collections::HashMap::new();
        for word in &words {
            *word_freq.entry(*word).or_insert(0) += 1;
        }

        // Map each unique word to multiple dimensions based on character
        // trigrams, plus one dimension for the whole word.
        for (word, freq) in word_freq.iter() {
            let chars: Vec<char> = word.chars().collect();
            for i in 0..chars.len().saturating_sub(2) {
                let trigram = format!(
                    "{}{}{}",
                    chars[i],
                    chars[i + 1],
                    chars.get(i + 2).unwrap_or(&' ')
                );
                let trigram_hash = trigram
                    .bytes()
                    .fold(0u64, |acc, b| acc.wrapping_mul(37).wrapping_add(b as u64));

                let dim_idx = (trigram_hash as usize) % self.dimensions;
                embedding[dim_idx] += (*freq as f32).sqrt();
            }

            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            let base_dim = (word_hash as usize) % self.dimensions;
            embedding[base_dim] += *freq as f32;
        }

        // Normalize to unit vector
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashProvider {
    fn provider_name(&self) -> &str {
        "hash"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| self.generate_embedding(text))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> HashProvider {
        HashProvider::new("hash-v1".to_string(), 384)
    }

    #[tokio::test]
    async fn test_dimensions_and_names() {
        let p = provider();
        assert_eq!(p.dimensions(), 384);
        assert_eq!(p.provider_name(), "hash");
        assert_eq!(p.model_name(), "hash-v1");
    }

    #[tokio::test]
    async fn test_embed_is_unit_vector() {
        let embedding = provider().embed("incident response plan").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_embed_deterministic() {
        let p = provider();
        let a = p.embed("backup retention schedule").await.unwrap();
        let b = p.embed("backup retention schedule").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_different_texts_differ() {
        let p = provider();
        let a = p.embed("access management policy").await.unwrap();
        let b = p.embed("disaster recovery drill").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedding = provider().embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_utf8_safety() {
        let embedding = provider()
            .embed("política de segurança da informação")
            .await
            .unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
