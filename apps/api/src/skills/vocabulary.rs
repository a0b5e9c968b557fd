use std::collections::BTreeSet;

use thiserror::Error;
use tracing::info;

use crate::embedding::{EmbeddingError, TextEmbedder};

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("skill vocabulary is empty")]
    Empty,

    #[error("vocabulary has {skills} skills but the embedder returned {vectors} vectors")]
    SizeMismatch { skills: usize, vectors: usize },

    #[error("skill vector {index} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("failed to embed vocabulary: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// The fixed set of known skills and their vectors.
///
/// Built once at startup and shared read-only behind an `Arc`. Skills are
/// lower-cased, deduplicated and sorted, so vocabulary indices (and therefore
/// similarity tie-breaks) are the same on every run.
#[derive(Debug)]
pub struct SkillVocabulary {
    skills: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

impl SkillVocabulary {
    pub async fn build(
        configured: &[String],
        embedder: &dyn TextEmbedder,
    ) -> Result<Self, VocabularyError> {
        let skills = normalize_skills(configured);
        if skills.is_empty() {
            return Err(VocabularyError::Empty);
        }

        let vectors = embedder.embed(&skills).await?;
        let vocabulary = Self::from_parts(skills, vectors)?;

        info!(
            skills = vocabulary.len(),
            dimension = vocabulary.dimension(),
            embedder = embedder.name(),
            "skill vocabulary ready"
        );
        Ok(vocabulary)
    }

    /// Pairs already-normalized skills with their vectors, checking sizes and dimensions.
    pub fn from_parts(
        skills: Vec<String>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self, VocabularyError> {
        if skills.is_empty() {
            return Err(VocabularyError::Empty);
        }
        if skills.len() != vectors.len() {
            return Err(VocabularyError::SizeMismatch {
                skills: skills.len(),
                vectors: vectors.len(),
            });
        }
        let expected = vectors[0].len();
        if let Some((index, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != expected) {
            return Err(VocabularyError::DimensionMismatch {
                index,
                expected,
                actual: v.len(),
            });
        }
        Ok(Self { skills, vectors })
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn skill_for(&self, index: usize) -> &str {
        &self.skills[index]
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn dimension(&self) -> usize {
        self.vectors.first().map(Vec::len).unwrap_or(0)
    }
}

fn normalize_skills(configured: &[String]) -> Vec<String> {
    configured
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
