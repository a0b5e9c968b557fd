//! Text-to-vector seam. Every embedding in the service goes through `TextEmbedder`.
//!
//! Backends:
//! - `HashedEmbedder`: local feature hashing without network access.
//! - `RemoteEmbedder`: OpenAI-compatible `/v1/embeddings` endpoint.
//!
//! The selected backend is carried as `Arc<dyn TextEmbedder>` and chosen at startup.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::EmbeddingBackend;

pub mod hashed;
pub mod remote;

pub use hashed::HashedEmbedder;
pub use remote::RemoteEmbedder;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("expected {expected} vectors, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

/// Turns a batch of strings into one vector per string, in input order.
/// All vectors from one embedder share the same dimensionality.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Builds the configured backend.
pub fn from_config(backend: &EmbeddingBackend) -> Arc<dyn TextEmbedder> {
    match backend {
        EmbeddingBackend::Hashed { dimension } => Arc::new(HashedEmbedder::new(*dimension)),
        EmbeddingBackend::Remote {
            base_url,
            model,
            api_key,
        } => Arc::new(RemoteEmbedder::new(
            base_url.clone(),
            model.clone(),
            api_key.clone(),
        )),
    }
}

/// Checks that an embedder answered with exactly one vector per input.
pub(crate) fn ensure_count(expected: usize, vectors: &[Vec<f32>]) -> Result<(), EmbeddingError> {
    if vectors.len() != expected {
        return Err(EmbeddingError::CountMismatch {
            expected,
            actual: vectors.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// One dimension per keyword; a text lights up every keyword it contains.
    /// Lets tests reason about similarities exactly.
    pub struct KeywordEmbedder {
        keywords: Vec<String>,
    }

    impl KeywordEmbedder {
        pub fn new(keywords: &[&str]) -> Self {
            Self {
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl TextEmbedder for KeywordEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|text| {
                    let words: Vec<&str> = text.split_whitespace().collect();
                    self.keywords
                        .iter()
                        .map(|k| {
                            let hit = if k.contains(' ') {
                                text.contains(k.as_str())
                            } else {
                                words.contains(&k.as_str())
                            };
                            if hit {
                                1.0
                            } else {
                                0.0
                            }
                        })
                        .collect()
                })
                .collect())
        }

        fn name(&self) -> &'static str {
            "keyword"
        }
    }

    /// Always returns one vector too few.
    pub struct ShortEmbedder;

    #[async_trait]
    impl TextEmbedder for ShortEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(vec![vec![1.0]; texts.len().saturating_sub(1)])
        }

        fn name(&self) -> &'static str {
            "short"
        }
    }
}
