//! Remote embedder for an OpenAI-compatible `POST {base_url}/v1/embeddings`.
//!
//! Retries on 429 (rate limit) and 5xx with exponential backoff. Works against
//! OpenAI and local servers that speak the same API (LM Studio, vLLM, Ollama).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ensure_count, EmbeddingError, TextEmbedder};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct RemoteEmbedder {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl RemoteEmbedder {
    pub fn new(base_url: String, model: String, api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url,
            model,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }
}

#[async_trait]
impl TextEmbedder for RemoteEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 500ms, 1s, 2s...
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "embedding call failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(self.endpoint())
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), "embedding API returned {body}");
                last_error = Some(if status.as_u16() == 429 {
                    EmbeddingError::RateLimited {
                        retries: attempt + 1,
                    }
                } else {
                    EmbeddingError::Api {
                        status: status.as_u16(),
                        message: body,
                    }
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(EmbeddingError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let vectors = parse_embeddings(&body)?;
            ensure_count(texts.len(), &vectors)?;

            debug!(count = vectors.len(), model = %self.model, "embedding call succeeded");
            return Ok(vectors);
        }

        Err(last_error.unwrap_or(EmbeddingError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

/// Parses an embeddings response body, restoring input order from the `index` field.
fn parse_embeddings(body: &str) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut parsed: EmbeddingResponse = serde_json::from_str(body)?;
    parsed.data.sort_by_key(|d| d.index);
    Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_embeddings_orders_by_index() {
        let body = r#"{
            "object": "list",
            "data": [
                {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]}
            ],
            "model": "text-embedding-3-small"
        }"#;
        let vectors = parse_embeddings(body).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_parse_embeddings_rejects_garbage() {
        assert!(matches!(
            parse_embeddings("not json"),
            Err(EmbeddingError::Parse(_))
        ));
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let embedder = RemoteEmbedder::new(
            "http://localhost:1234".to_string(),
            "nomic-embed-text".to_string(),
            "key".to_string(),
        );
        assert_eq!(embedder.endpoint(), "http://localhost:1234/v1/embeddings");
    }

    #[tokio::test]
    async fn test_empty_batch_skips_network() {
        let embedder = RemoteEmbedder::new(
            "http://127.0.0.1:9".to_string(),
            "m".to_string(),
            "k".to_string(),
        );
        assert!(embedder.embed(&[]).await.unwrap().is_empty());
    }
}
