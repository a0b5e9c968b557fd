//! Nearest-skill matching: argmax cosine similarity, then a threshold.

use crate::skills::vocabulary::SkillVocabulary;

/// The best vocabulary candidate for one phrase. Only lives until the accept/reject decision.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatch<'a> {
    pub phrase: &'a str,
    pub skill_index: usize,
    pub score: f32,
}

/// Cosine similarity in [-1, 1]. Zero-norm or mismatched vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        tracing::warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[derive(Debug, Clone, Copy)]
pub struct SkillMatcher {
    threshold: f32,
}

impl SkillMatcher {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Highest-similarity skill for `phrase_vector`. Ties keep the lowest vocabulary index.
    pub fn best_match<'a>(
        &self,
        phrase: &'a str,
        phrase_vector: &[f32],
        vocabulary: &SkillVocabulary,
    ) -> Option<SkillMatch<'a>> {
        let mut best: Option<SkillMatch<'a>> = None;

        for (idx, skill_vector) in vocabulary.vectors().iter().enumerate() {
            let score = cosine_similarity(phrase_vector, skill_vector);
            // strictly greater: first occurrence wins ties, NaN never wins
            let better = match &best {
                None => !score.is_nan(),
                Some(current) => score > current.score,
            };
            if better {
                best = Some(SkillMatch {
                    phrase,
                    skill_index: idx,
                    score,
                });
            }
        }

        best
    }

    /// The accepted skill for a phrase, or `None` if the best match is below the threshold.
    pub fn accept<'v>(
        &self,
        phrase: &str,
        phrase_vector: &[f32],
        vocabulary: &'v SkillVocabulary,
    ) -> Option<&'v str> {
        let candidate = self.best_match(phrase, phrase_vector, vocabulary)?;
        if candidate.score >= self.threshold {
            tracing::trace!(
                phrase = candidate.phrase,
                skill = vocabulary.skill_for(candidate.skill_index),
                score = candidate.score,
                "phrase accepted"
            );
            Some(vocabulary.skill_for(candidate.skill_index))
        } else {
            None
        }
    }
}

impl Default for SkillMatcher {
    fn default() -> Self {
        Self::new(0.3)
    }
}
