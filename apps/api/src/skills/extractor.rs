use std::sync::Arc;

use tracing::debug;

use crate::embedding::{ensure_count, EmbeddingError, TextEmbedder};
use crate::skills::matcher::SkillMatcher;
use crate::skills::normalize;
use crate::skills::vocabulary::SkillVocabulary;
use crate::skills::SkillSet;

/// Turns one document's text into its set of vocabulary skills.
///
/// Algorithm:
/// 1. Clean and split the text into phrases
/// 2. Embed all phrases in a single batched call
/// 3. For each phrase keep the nearest vocabulary skill if it clears the threshold
/// 4. Collect accepted skills into a sorted set
///
/// Same text, vocabulary and threshold always give the same set.
#[derive(Clone)]
pub struct SkillSetExtractor {
    vocabulary: Arc<SkillVocabulary>,
    embedder: Arc<dyn TextEmbedder>,
    matcher: SkillMatcher,
}

impl SkillSetExtractor {
    pub fn new(
        vocabulary: Arc<SkillVocabulary>,
        embedder: Arc<dyn TextEmbedder>,
        matcher: SkillMatcher,
    ) -> Self {
        Self {
            vocabulary,
            embedder,
            matcher,
        }
    }

    pub fn vocabulary(&self) -> &SkillVocabulary {
        &self.vocabulary
    }

    pub async fn extract(&self, text: &str) -> Result<SkillSet, EmbeddingError> {
        let phrases = normalize::phrases(text);
        if phrases.is_empty() {
            return Ok(SkillSet::new());
        }

        let vectors = self.embedder.embed(&phrases).await?;
        ensure_count(phrases.len(), &vectors)?;

        let skills: SkillSet = phrases
            .iter()
            .zip(vectors.iter())
            .filter_map(|(phrase, vector)| self.matcher.accept(phrase, vector, &self.vocabulary))
            .collect();

        debug!(
            phrases = phrases.len(),
            skills = skills.len(),
            "extracted skills from document"
        );
        Ok(skills)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::embedding::testing::{KeywordEmbedder, ShortEmbedder};

    const KEYWORDS: &[&str] = &["python", "sql", "html", "css", "machine learning"];

    async fn extractor_with(skills: &[&str], embedder: Arc<dyn TextEmbedder>) -> SkillSetExtractor {
        let owned: Vec<String> = skills.iter().map(|s| s.to_string()).collect();
        let vocabulary = SkillVocabulary::build(&owned, embedder.as_ref())
            .await
            .unwrap();
        SkillSetExtractor::new(Arc::new(vocabulary), embedder, SkillMatcher::default())
    }

    async fn keyword_extractor(skills: &[&str]) -> SkillSetExtractor {
        extractor_with(skills, Arc::new(KeywordEmbedder::new(KEYWORDS))).await
    }

    /// Counts embed calls and the batch sizes it saw.
    struct CountingEmbedder {
        inner: KeywordEmbedder,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextEmbedder for CountingEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed(texts).await
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_comma_separated_skills_are_extracted() {
        let extractor = keyword_extractor(&["python", "sql"]).await;
        let skills = extractor.extract("Experienced in Python, SQL.").await.unwrap();
        assert_eq!(skills.into_vec(), vec!["python", "sql"]);
    }

    #[tokio::test]
    async fn test_one_phrase_yields_at_most_one_skill() {
        let extractor = keyword_extractor(&["python", "sql"]).await;
        // both keywords in one phrase tie; the lower vocabulary index wins
        let skills = extractor
            .extract("Experienced in Python and SQL.")
            .await
            .unwrap();
        assert_eq!(skills.into_vec(), vec!["python"]);
    }

    #[tokio::test]
    async fn test_exact_standalone_skill_is_always_found() {
        let extractor = keyword_extractor(&["python", "sql", "html", "css"]).await;
        let skills = extractor
            .extract("Hobbies: chess\nhtml\nreading")
            .await
            .unwrap();
        assert!(skills.iter().any(|s| s == "html"));
    }

    #[tokio::test]
    async fn test_empty_text_is_empty_set_without_embedding() {
        let embedder = Arc::new(CountingEmbedder {
            inner: KeywordEmbedder::new(KEYWORDS),
            calls: AtomicUsize::new(0),
        });
        let extractor = extractor_with(&["python"], embedder.clone()).await;
        let calls_after_vocab = embedder.calls.load(Ordering::SeqCst);

        assert!(extractor.extract("").await.unwrap().is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), calls_after_vocab);
    }

    #[tokio::test]
    async fn test_one_embedding_call_per_document() {
        let embedder = Arc::new(CountingEmbedder {
            inner: KeywordEmbedder::new(KEYWORDS),
            calls: AtomicUsize::new(0),
        });
        let extractor = extractor_with(&["python", "sql", "css"], embedder.clone()).await;
        let before = embedder.calls.load(Ordering::SeqCst);

        extractor
            .extract("python, sql, css, leadership, teamwork")
            .await
            .unwrap();
        assert_eq!(embedder.calls.load(Ordering::SeqCst), before + 1);
    }

    #[tokio::test]
    async fn test_unrelated_phrases_are_rejected() {
        let extractor = keyword_extractor(&["python", "sql"]).await;
        let skills = extractor
            .extract("Team player, great communicator")
            .await
            .unwrap();
        assert!(skills.is_empty());
    }

    #[tokio::test]
    async fn test_extraction_is_idempotent() {
        let extractor = keyword_extractor(KEYWORDS).await;
        let text = "Built machine learning models; shipped HTML, CSS and python tooling.";
        let first = extractor.extract(text).await.unwrap();
        let second = extractor.extract(text).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_skills_are_subset_of_vocabulary() {
        let extractor = keyword_extractor(&["python", "sql"]).await;
        let skills = extractor
            .extract("python, sql, html, css")
            .await
            .unwrap();
        for skill in skills.iter() {
            assert!(["python", "sql"].contains(&skill), "{skill} not in vocabulary");
        }
    }

    #[tokio::test]
    async fn test_short_embedding_response_is_an_error() {
        let extractor = keyword_extractor(&["python"]).await;
        let broken = SkillSetExtractor::new(
            extractor.vocabulary.clone(),
            Arc::new(ShortEmbedder),
            SkillMatcher::default(),
        );
        let err = broken.extract("python, sql").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::CountMismatch { .. }));
    }
}
