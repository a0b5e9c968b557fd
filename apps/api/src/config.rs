use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.3;
const DEFAULT_MAX_CLUSTERS: usize = 6;
const DEFAULT_CLUSTER_SEED: u64 = 42;
const DEFAULT_EMBEDDING_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_HASHED_DIMENSION: usize = 384;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Which text-to-vector backend the service embeds phrases with.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingBackend {
    /// Deterministic feature-hashing embedder, no network access.
    Hashed { dimension: usize },
    /// OpenAI-compatible `/v1/embeddings` endpoint.
    Remote {
        base_url: String,
        model: String,
        api_key: String,
    },
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Minimum cosine similarity for a phrase to count as a skill.
    /// Raising it extracts fewer, more precise skills; lowering it extracts more.
    pub similarity_threshold: f32,
    pub max_clusters: usize,
    pub cluster_seed: u64,
    pub catalog_path: Option<PathBuf>,
    pub embedding: EmbeddingBackend,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let similarity_threshold: f32 = parse_or(
            &lookup,
            "SKILL_SIMILARITY_THRESHOLD",
            DEFAULT_SIMILARITY_THRESHOLD,
        )?;
        if !similarity_threshold.is_finite() || !(-1.0..=1.0).contains(&similarity_threshold) {
            bail!("SKILL_SIMILARITY_THRESHOLD must be within [-1, 1], got {similarity_threshold}");
        }

        let max_clusters: usize = parse_or(&lookup, "MAX_CAREER_CLUSTERS", DEFAULT_MAX_CLUSTERS)?;
        if max_clusters == 0 {
            bail!("MAX_CAREER_CLUSTERS must be at least 1");
        }

        let backend = lookup("EMBEDDING_BACKEND").unwrap_or_else(|| "hashed".to_string());
        let embedding = match backend.trim().to_ascii_lowercase().as_str() {
            "hashed" => {
                let dimension: usize =
                    parse_or(&lookup, "HASHED_EMBEDDING_DIM", DEFAULT_HASHED_DIMENSION)?;
                if dimension == 0 {
                    bail!("HASHED_EMBEDDING_DIM must be at least 1");
                }
                EmbeddingBackend::Hashed { dimension }
            }
            "openai" => EmbeddingBackend::Remote {
                base_url: lookup("EMBEDDING_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                model: lookup("EMBEDDING_MODEL")
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
                api_key: lookup("EMBEDDING_API_KEY").with_context(|| {
                    "Required environment variable 'EMBEDDING_API_KEY' is not set".to_string()
                })?,
            },
            other => bail!("EMBEDDING_BACKEND must be 'hashed' or 'openai', got '{other}'"),
        };

        Ok(Config {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            similarity_threshold,
            max_clusters,
            cluster_seed: parse_or(&lookup, "CLUSTER_SEED", DEFAULT_CLUSTER_SEED)?,
            catalog_path: lookup("CAREER_CATALOG_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            embedding,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    /// Defaults only; used by tests that need a state without touching the environment.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::from_lookup(|_| None).expect("default config is valid")
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
