//! Career catalog: the skill vocabulary and the ordered career rules.
//!
//! The built-in catalog is used unless `CAREER_CATALOG_PATH` points at a JSON file
//! with the same shape. Rule order matters: the first rule whose skills appear in a
//! cluster's top skills decides the label.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const FALLBACK_CAREER: &str = "Generalist / Software Engineer";

const DEFAULT_SKILLS: &[&str] = &[
    "python",
    "numpy",
    "pandas",
    "matplotlib",
    "seaborn",
    "plotly",
    "cufflinks",
    "geoplotting",
    "machine learning",
    "deep learning",
    "cnn",
    "ann",
    "supervised learning",
    "unsupervised learning",
    "php",
    "django",
    "html",
    "css",
    "sql",
    "javascript",
    "c",
    "c++",
    "data structures",
    "algorithms",
    "xgboost",
    "k-means",
    "transformers",
    "llms",
    "hugging face",
    "t5",
    "wav2vec2",
    "google colab",
    "flask",
    "streamlit",
    "react",
    "pytorch",
    "tensorflow",
    "linux",
    "git",
    "docker",
    "mysql",
    "postgresql",
];

const DEFAULT_RULES: &[(&str, &[&str])] = &[
    (
        "Machine Learning Engineer",
        &["machine learning", "pytorch", "tensorflow"],
    ),
    ("Frontend Web Developer", &["html", "css", "javascript"]),
    ("Backend Web Developer", &["django", "flask", "sql"]),
    ("App Developer", &["flutter", "android"]),
    ("Cloud Engineer", &["docker", "linux", "aws"]),
];

/// One labeling rule: the cluster gets `label` if any of `any_of` is among its top skills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerRule {
    pub label: String,
    pub any_of: Vec<String>,
}

impl CareerRule {
    pub fn matches<'a, I>(&self, skills: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        skills
            .into_iter()
            .any(|skill| self.any_of.iter().any(|s| s.eq_ignore_ascii_case(skill)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerCatalog {
    pub skills: Vec<String>,
    pub career_rules: Vec<CareerRule>,
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,
}

fn default_fallback_label() -> String {
    FALLBACK_CAREER.to_string()
}

impl Default for CareerCatalog {
    fn default() -> Self {
        Self {
            skills: DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect(),
            career_rules: DEFAULT_RULES
                .iter()
                .map(|(label, any_of)| CareerRule {
                    label: label.to_string(),
                    any_of: any_of.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
            fallback_label: default_fallback_label(),
        }
    }
}

impl CareerCatalog {
    /// Loads the catalog from `path`, or the built-in one when no path is configured.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read career catalog at {}", path.display()))?;
        let catalog: CareerCatalog = serde_json::from_str(&raw)
            .with_context(|| format!("Career catalog at {} is not valid JSON", path.display()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        if self.skills.iter().all(|s| s.trim().is_empty()) {
            bail!("Career catalog must list at least one skill");
        }
        if let Some(rule) = self.career_rules.iter().find(|r| r.label.trim().is_empty()) {
            bail!("Career rule for {:?} has an empty label", rule.any_of);
        }
        Ok(())
    }

    /// Rule skills that are not in the vocabulary and therefore can never be extracted.
    pub fn unreachable_rule_skills(&self) -> Vec<String> {
        let vocabulary: BTreeSet<String> = self
            .skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();
        let unreachable: BTreeSet<String> = self
            .career_rules
            .iter()
            .flat_map(|r| r.any_of.iter())
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !vocabulary.contains(s))
            .collect();
        unreachable.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_rules_keep_their_order() {
        let catalog = CareerCatalog::default();
        let labels: Vec<_> = catalog
            .career_rules
            .iter()
            .map(|r| r.label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Machine Learning Engineer",
                "Frontend Web Developer",
                "Backend Web Developer",
                "App Developer",
                "Cloud Engineer",
            ]
        );
        assert_eq!(catalog.fallback_label, FALLBACK_CAREER);
    }

    #[test]
    fn test_default_catalog_flags_rule_skills_missing_from_vocabulary() {
        let catalog = CareerCatalog::default();
        assert_eq!(
            catalog.unreachable_rule_skills(),
            vec!["android".to_string(), "aws".to_string(), "flutter".to_string()]
        );
    }

    #[test]
    fn test_rule_matching_is_case_insensitive() {
        let rule = CareerRule {
            label: "Cloud Engineer".to_string(),
            any_of: vec!["docker".to_string()],
        };
        assert!(rule.matches(["git", "Docker"]));
        assert!(!rule.matches(["git"]));
    }

    #[test]
    fn test_load_without_path_is_default() {
        assert_eq!(CareerCatalog::load(None).unwrap(), CareerCatalog::default());
    }

    #[test]
    fn test_load_from_file_defaults_fallback_label() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"skills": ["rust", "go"], "career_rules": [{{"label": "Systems", "any_of": ["rust"]}}]}}"#
        )
        .unwrap();

        let catalog = CareerCatalog::load(Some(file.path())).unwrap();
        assert_eq!(catalog.skills, vec!["rust", "go"]);
        assert_eq!(catalog.career_rules[0].label, "Systems");
        assert_eq!(catalog.fallback_label, FALLBACK_CAREER);
    }

    #[test]
    fn test_load_rejects_empty_vocabulary() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"skills": [" "], "career_rules": []}}"#).unwrap();
        assert!(CareerCatalog::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_load_rejects_missing_file() {
        let missing = Path::new("/definitely/not/here/catalog.json");
        assert!(CareerCatalog::load(Some(missing)).is_err());
    }
}
