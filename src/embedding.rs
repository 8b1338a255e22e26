//! Remote embedding generation over the provider's embeddings endpoint.
//!
//! All calls are synchronous (blocking HTTP), matching muisti's no-async policy.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{Config, Provider};
use crate::errors::Error;
use crate::http::HttpClient;

/// Provider interface for generating fixed-dimension embeddings.
///
/// Implementations must return vectors with exactly `dimensions()` entries.
pub trait Embedder: Send {
    /// Generate an embedding for a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, Error>;

    /// Generate embeddings for a batch of texts, preserving order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, Error>;

    /// Dimensions of the vectors this embedder produces.
    fn dimensions(&self) -> usize;

    /// Model or deployment name used for requests.
    fn model_name(&self) -> &str;
}

/// HTTP embedding client for OpenAI and Azure OpenAI.
pub struct HttpEmbeddingClient {
    http: HttpClient,
    provider: Provider,
    api_key: String,
    endpoint: String,
    api_version: String,
    model: String,
    dims: usize,
}

fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// True when the last path segment looks like an API version (`v1`, `v4`, ...).
fn has_version_suffix(base_url: &str) -> bool {
    let Some(last_segment) = base_url.rsplit('/').next() else {
        return false;
    };
    let Some(rest) = last_segment.strip_prefix('v') else {
        return false;
    };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// Build the OpenAI embeddings URL without duplicating a version segment.
fn openai_embeddings_url(base_url: &str) -> String {
    let normalized = normalize_base_url(base_url);
    if normalized.ends_with("/embeddings") {
        return normalized;
    }
    if has_version_suffix(&normalized) {
        return format!("{normalized}/embeddings");
    }
    format!("{normalized}/v1/embeddings")
}

/// Build the Azure OpenAI embeddings URL for a deployment.
fn azure_embeddings_url(base_url: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/embeddings?api-version={}",
        normalize_base_url(base_url),
        deployment,
        api_version
    )
}

impl HttpEmbeddingClient {
    /// Construct a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no API key is configured, or if the Azure
    /// OpenAI provider is selected without an endpoint.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            Error::Config(match config.provider {
                Provider::OpenAi => {
                    "No API key configured (set MUISTI_API_KEY or OPENAI_API_KEY)".to_string()
                }
                Provider::AzureOpenAi => {
                    "No API key configured (set MUISTI_API_KEY or AZURE_OPENAI_API_KEY)".to_string()
                }
            })
        })?;

        let endpoint = match config.provider {
            Provider::OpenAi => config
                .endpoint
                .clone()
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
            Provider::AzureOpenAi => config.endpoint.clone().ok_or_else(|| {
                Error::Config("Azure OpenAI requires an endpoint (set MUISTI_ENDPOINT)".to_string())
            })?,
        };

        Ok(HttpEmbeddingClient {
            http: HttpClient::new(),
            provider: config.provider,
            api_key,
            endpoint,
            api_version: config.api_version.clone(),
            model: config.embedding_model.clone(),
            dims: config.embedding_dims,
        })
    }

    fn url(&self) -> String {
        match self.provider {
            Provider::OpenAi => openai_embeddings_url(&self.endpoint),
            Provider::AzureOpenAi => {
                azure_embeddings_url(&self.endpoint, &self.model, self.api_version.as_str())
            }
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    /// Azure routes by deployment in the URL; the body model field is for OpenAI.
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl Embedder for HttpEmbeddingClient {
    fn embed(&self, text: &str) -> Result<Vec<f32>, Error> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| Error::Provider("empty embedding response".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, Error> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(count = texts.len(), model = %self.model, "embedding request");

        let request = EmbeddingRequest {
            model: match self.provider {
                Provider::OpenAi => Some(self.model.as_str()),
                Provider::AzureOpenAi => None,
            },
            input: texts,
        };

        let auth_header = format!("Bearer {}", self.api_key);
        let headers: Vec<(&str, &str)> = match self.provider {
            Provider::OpenAi => vec![("Authorization", auth_header.as_str())],
            Provider::AzureOpenAi => vec![("api-key", self.api_key.as_str())],
        };

        let response: EmbeddingResponse =
            self.http
                .send_json("POST", &self.url(), &headers, Some(&request))?;

        if response.data.len() != texts.len() {
            return Err(Error::Provider(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }

        let mut vectors = Vec::with_capacity(response.data.len());
        for data in response.data {
            if data.embedding.len() != self.dims {
                return Err(Error::Provider(format!(
                    "expected {}-dimensional embedding, got {}",
                    self.dims,
                    data.embedding.len()
                )));
            }
            vectors.push(data.embedding);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
