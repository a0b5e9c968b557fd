//! The two user-facing operations.
//!
//! `extract_skills`: text → skill set.
//! `suggest_careers`: documents → skill sets → matrix → clusters → one label per cluster.

use std::sync::Arc;

use anyhow::anyhow;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::info;

use crate::careers::documents::Document;
use crate::catalog::CareerCatalog;
use crate::clustering::clusterer::ResumeClusterer;
use crate::clustering::labeler::ClusterLabeler;
use crate::clustering::matrix::SkillMatrix;
use crate::clustering::partition::Partitioner;
use crate::config::Config;
use crate::embedding::TextEmbedder;
use crate::errors::AppError;
use crate::skills::extractor::SkillSetExtractor;
use crate::skills::matcher::SkillMatcher;
use crate::skills::vocabulary::{SkillVocabulary, VocabularyError};
use crate::skills::SkillSet;

/// One resume's result in a clustering batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerSuggestion {
    pub file: String,
    pub skills: Vec<String>,
    pub cluster: usize,
    pub career_suggestion: String,
}

pub struct CareerPipeline {
    extractor: SkillSetExtractor,
    clusterer: ResumeClusterer,
    labeler: ClusterLabeler,
}

impl CareerPipeline {
    pub fn new(
        extractor: SkillSetExtractor,
        clusterer: ResumeClusterer,
        labeler: ClusterLabeler,
    ) -> Self {
        Self {
            extractor,
            clusterer,
            labeler,
        }
    }

    /// Embeds the catalog vocabulary and wires every stage. Called once at startup.
    pub async fn build(
        config: &Config,
        catalog: &CareerCatalog,
        embedder: Arc<dyn TextEmbedder>,
        partitioner: Arc<dyn Partitioner>,
    ) -> Result<Self, VocabularyError> {
        let vocabulary = SkillVocabulary::build(&catalog.skills, embedder.as_ref()).await?;
        let extractor = SkillSetExtractor::new(
            Arc::new(vocabulary),
            embedder,
            SkillMatcher::new(config.similarity_threshold),
        );
        let clusterer = ResumeClusterer::new(partitioner, config.max_clusters, config.cluster_seed);
        let labeler = ClusterLabeler::from_catalog(catalog);
        Ok(Self::new(extractor, clusterer, labeler))
    }

    pub fn vocabulary_size(&self) -> usize {
        self.extractor.vocabulary().len()
    }

    pub async fn extract_skills(&self, text: &str) -> Result<SkillSet, AppError> {
        Ok(self.extractor.extract(text).await?)
    }

    /// Extracts every document concurrently, clusters the batch and labels each cluster.
    /// Output has one record per input document, in input order.
    pub async fn suggest_careers(
        &self,
        documents: Vec<Document>,
    ) -> Result<Vec<CareerSuggestion>, AppError> {
        if documents.is_empty() {
            return Err(AppError::Validation(
                "at least one resume is required".to_string(),
            ));
        }

        let skill_sets = self.extract_all(&documents).await?;

        let matrix = SkillMatrix::build(&skill_sets);
        let assignment = self.clusterer.cluster(&matrix)?;
        let labels = self.labeler.label_all(&matrix, &assignment);

        info!(
            documents = documents.len(),
            skills = matrix.n_columns(),
            clusters = assignment.k,
            "career suggestions computed"
        );

        Ok(documents
            .into_iter()
            .zip(skill_sets)
            .zip(assignment.labels.iter())
            .map(|((doc, skills), &cluster)| CareerSuggestion {
                file: doc.name,
                skills: skills.into_vec(),
                cluster,
                career_suggestion: labels[cluster].clone(),
            })
            .collect())
    }

    async fn extract_all(&self, documents: &[Document]) -> Result<Vec<SkillSet>, AppError> {
        let mut tasks = JoinSet::new();
        for (idx, doc) in documents.iter().enumerate() {
            let extractor = self.extractor.clone();
            let text = doc.text.clone();
            tasks.spawn(async move { (idx, extractor.extract(&text).await) });
        }

        let mut slots: Vec<Option<SkillSet>> = vec![None; documents.len()];
        while let Some(joined) = tasks.join_next().await {
            let (idx, result) =
                joined.map_err(|e| AppError::Internal(anyhow!("extraction task failed: {e}")))?;
            slots[idx] = Some(result?);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.ok_or_else(|| {
                    AppError::Internal(anyhow!("missing extraction result for document {idx}"))
                })
            })
            .collect()
    }
}
