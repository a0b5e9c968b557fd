//! Cluster labeling: maps a cluster's most frequent skills to a career track.
//!
//! A coarse heuristic, not a classifier: no confidence score is produced.

use std::cmp::Ordering;

use ndarray::{Array1, Axis};
use serde::Serialize;

use crate::catalog::{CareerCatalog, CareerRule};
use crate::clustering::clusterer::ClusterAssignment;
use crate::clustering::matrix::SkillMatrix;

const TOP_SKILLS: usize = 5;

/// A skill and how many resumes in the cluster list it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillFrequency {
    pub skill: String,
    pub count: usize,
}

/// Ordered rules, first match wins; the fallback label applies when nothing matches.
#[derive(Debug, Clone)]
pub struct ClusterLabeler {
    rules: Vec<CareerRule>,
    fallback: String,
    top_n: usize,
}

impl ClusterLabeler {
    pub fn new(rules: Vec<CareerRule>, fallback: String) -> Self {
        Self {
            rules,
            fallback,
            top_n: TOP_SKILLS,
        }
    }

    pub fn from_catalog(catalog: &CareerCatalog) -> Self {
        Self::new(catalog.career_rules.clone(), catalog.fallback_label.clone())
    }

    /// Most frequent skills in a cluster, highest count first, ties by skill name.
    /// Every column of the batch is ranked, so a cluster with fewer than five skills
    /// is topped up with zero-count columns in name order.
    pub fn top_skills(
        &self,
        cluster_id: usize,
        matrix: &SkillMatrix,
        assignment: &ClusterAssignment,
    ) -> Vec<SkillFrequency> {
        if matrix.is_degenerate() {
            return Vec::new();
        }

        let rows: Vec<usize> = assignment.members(cluster_id).collect();
        let counts: Array1<usize> = if rows.is_empty() {
            Array1::zeros(matrix.n_columns())
        } else {
            matrix
                .cells
                .select(Axis(0), &rows)
                .mapv(usize::from)
                .sum_axis(Axis(0))
        };

        let mut frequencies: Vec<SkillFrequency> = matrix
            .columns
            .iter()
            .zip(counts.iter())
            .map(|(skill, &count)| SkillFrequency {
                skill: skill.clone(),
                count,
            })
            .collect();

        frequencies.sort_by(|a, b| match b.count.cmp(&a.count) {
            Ordering::Equal => a.skill.cmp(&b.skill),
            other => other,
        });
        frequencies.truncate(self.top_n);
        frequencies
    }

    /// Applies the rules to a list of top skills.
    pub fn label_for_skills(&self, skills: &[SkillFrequency]) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.matches(skills.iter().map(|f| f.skill.as_str())))
            .map(|rule| rule.label.as_str())
            .unwrap_or(&self.fallback)
    }

    pub fn label(
        &self,
        cluster_id: usize,
        matrix: &SkillMatrix,
        assignment: &ClusterAssignment,
    ) -> String {
        let top = self.top_skills(cluster_id, matrix, assignment);
        self.label_for_skills(&top).to_string()
    }

    /// One label per cluster id in `[0, k)`, including clusters with no members.
    pub fn label_all(&self, matrix: &SkillMatrix, assignment: &ClusterAssignment) -> Vec<String> {
        (0..assignment.k)
            .map(|cluster_id| self.label(cluster_id, matrix, assignment))
            .collect()
    }
}
