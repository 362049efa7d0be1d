//! Word alignment engine
//!
//! Greedy nearest-neighbor alignment: every reference word picks the sung
//! word with the highest embedding cosine similarity, independently of the
//! other reference words. A sung word may be the best match for several
//! reference words; duplicate lyrics legitimately remap to the same sung
//! token, so no exclusivity is enforced.

use crate::providers::{cosine_similarity, SimilarityProvider};
use crate::types::AlignmentPair;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Sentinel similarity used when there is nothing sung to match against.
/// Always lands in the lowest bucket.
pub const NO_MATCH_SIMILARITY: f32 = -1.0;

pub struct AlignmentEngine {
    similarity: Arc<dyn SimilarityProvider>,
    /// Process-lifetime embedding memo, keyed by exact word text. Song
    /// vocabularies overlap heavily across requests.
    embedding_cache: Mutex<HashMap<String, Arc<Vec<f32>>>>,
}

impl AlignmentEngine {
    pub fn new(similarity: Arc<dyn SimilarityProvider>) -> Self {
        Self {
            similarity,
            embedding_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Align sung words to reference words.
    ///
    /// Produces exactly one pair per reference word, in reference order.
    /// Ties go to the earliest sung word. An empty sung list yields empty
    /// matches with the sentinel similarity.
    pub async fn align(
        &self,
        reference: &[String],
        sung: &[String],
    ) -> Result<Vec<AlignmentPair>> {
        if sung.is_empty() {
            return Ok(reference
                .iter()
                .map(|word| AlignmentPair {
                    reference: word.clone(),
                    sung: None,
                    similarity: NO_MATCH_SIMILARITY,
                })
                .collect());
        }

        // Embed each distinct word once; the same word often recurs in
        // both sequences.
        let mut embeddings: HashMap<&str, Arc<Vec<f32>>> = HashMap::new();
        for word in reference.iter().chain(sung.iter()) {
            if !embeddings.contains_key(word.as_str()) {
                let vector = self.embedding(word).await?;
                embeddings.insert(word.as_str(), vector);
            }
        }

        let mut pairs = Vec::with_capacity(reference.len());
        for reference_word in reference {
            let reference_embedding = &embeddings[reference_word.as_str()];

            let mut best_similarity = f32::NEG_INFINITY;
            let mut best_word: Option<&String> = None;
            for sung_word in sung {
                let similarity =
                    cosine_similarity(reference_embedding, &embeddings[sung_word.as_str()]);
                // Strict comparison: the earliest sung word wins ties.
                if similarity > best_similarity {
                    best_similarity = similarity;
                    best_word = Some(sung_word);
                }
            }

            pairs.push(AlignmentPair {
                reference: reference_word.clone(),
                sung: best_word.cloned(),
                similarity: best_similarity,
            });
        }

        debug!(
            reference_words = reference.len(),
            sung_words = sung.len(),
            "Alignment complete"
        );
        Ok(pairs)
    }

    async fn embedding(&self, word: &str) -> Result<Arc<Vec<f32>>> {
        if let Some(hit) = self.embedding_cache.lock().await.get(word) {
            return Ok(hit.clone());
        }

        let vector = self
            .similarity
            .embed(word)
            .await
            .with_context(|| format!("embedding provider failed for '{}'", word))?;
        let vector = Arc::new(vector);

        self.embedding_cache
            .lock()
            .await
            .insert(word.to_string(), vector.clone());
        Ok(vector)
    }
}
