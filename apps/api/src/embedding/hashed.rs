use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use siphasher::sip::SipHasher13;

use super::{EmbeddingError, TextEmbedder};

// Changing either key changes every vector.
const HASH_KEY_0: u64 = 0x5eed_0f5c_a11e_d5e7;
const HASH_KEY_1: u64 = 0x7e57_ab1e_c0de_cafe;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Feature-hashing embedder.
///
/// Each text contributes its whitespace-separated words and the character trigrams
/// of every word padded with `#`. Tokens are hashed into `dimension` buckets with a
/// sign bit, and the vector is L2-normalized. Identical inputs always produce
/// identical vectors, so an exact skill string matches itself with similarity 1.0.
pub struct HashedEmbedder {
    dimension: usize,
}

impl HashedEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash(&self, token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_KEY_0, HASH_KEY_1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn add_token(&self, vector: &mut [f32], token: &str, weight: f32) {
        let h = self.hash(token);
        let idx = (h % self.dimension as u64) as usize;
        // top bit picks the sign so collisions tend to cancel instead of pile up
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let lowered = text.to_lowercase();

        for word in lowered.split_whitespace() {
            self.add_token(&mut vector, word, WORD_WEIGHT);

            let padded: Vec<char> = format!("#{word}#").chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_token(&mut vector, &trigram, TRIGRAM_WEIGHT);
            }
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl TextEmbedder for HashedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn name(&self) -> &'static str {
        "hashed"
    }
}
