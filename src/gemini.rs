//! Gemini providers for embedding and generation.
//!
//! Both clients call the Generative Language REST API and authenticate
//! with an API key from `GOOGLE_API_KEY`. [`GeminiEmbedder`] implements
//! [`Embedder`] over `batchEmbedContents`; [`GeminiGenerator`] implements
//! [`GenerationGateway`] over `generateContent`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::Embedder;
use crate::error::{DocIntelError, Result};
use crate::generation::GenerationGateway;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_ENV: &str = "GOOGLE_API_KEY";

const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 768;

const DEFAULT_GENERATION_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Embedding provider backed by the Gemini embeddings API.
pub struct GeminiEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl GeminiEmbedder {
    /// Create an embedder with the default model (`text-embedding-004`).
    ///
    /// # Errors
    ///
    /// Returns [`DocIntelError::Config`] if `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DocIntelError::Config(
                "Gemini API key must not be empty".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        })
    }

    /// Create an embedder from the `GOOGLE_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`DocIntelError::Config`] if the variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            DocIntelError::Config(format!("{API_KEY_ENV} environment variable not set"))
        })?;
        Self::new(api_key)
    }

    /// Use a different embedding model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Declare a different embedding dimension, for models whose output
    /// size differs from the default.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    fn url(&self) -> String {
        format!(
            "{GEMINI_API_BASE}/models/{}:batchEmbedContents",
            self.model
        )
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request = EmbedBatchRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: format!("models/{}", self.model),
                    content: Content {
                        parts: vec![Part { text }],
                    },
                })
                .collect(),
        };

        debug!(
            provider = "Gemini",
            model = %self.model,
            batch_size = texts.len(),
            "requesting embeddings"
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocIntelError::Embedding {
                provider: "Gemini".to_string(),
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = read_error_detail(response).await;
            error!(provider = "Gemini", %status, "embedding API error");
            return Err(DocIntelError::Embedding {
                provider: "Gemini".to_string(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let parsed: EmbedBatchResponse =
            response.json().await.map_err(|e| DocIntelError::Embedding {
                provider: "Gemini".to_string(),
                message: format!("failed to parse response: {e}"),
            })?;

        if parsed.embeddings.len() != texts.len() {
            return Err(DocIntelError::Embedding {
                provider: "Gemini".to_string(),
                message: format!(
                    "API returned {} embeddings for {} inputs",
                    parsed.embeddings.len(),
                    texts.len()
                ),
            });
        }

        Ok(parsed
            .embeddings
            .into_iter()
            .map(|embedding| embedding.values)
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Generation provider backed by the Gemini `generateContent` API.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiGenerator {
    /// Create a generator with the default model (`gemini-1.5-flash`),
    /// temperature 0.2, and a 2048 output token limit.
    ///
    /// # Errors
    ///
    /// Returns [`DocIntelError::Config`] if `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DocIntelError::Config(
                "Gemini API key must not be empty".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_GENERATION_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        })
    }

    /// Create a generator from the `GOOGLE_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`DocIntelError::Config`] if the variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            DocIntelError::Config(format!("{API_KEY_ENV} environment variable not set"))
        })?;
        Self::new(api_key)
    }

    /// Use a different generation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a different sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Use a different output token limit.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    fn url(&self) -> String {
        format!("{GEMINI_API_BASE}/models/{}:generateContent", self.model)
    }
}

#[async_trait]
impl GenerationGateway for GeminiGenerator {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        debug!(
            provider = "Gemini",
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "requesting completion"
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocIntelError::Generation {
                provider: "Gemini".to_string(),
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = read_error_detail(response).await;
            error!(provider = "Gemini", %status, "generation API error");
            return Err(DocIntelError::Generation {
                provider: "Gemini".to_string(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let parsed: GenerateResponse =
            response.json().await.map_err(|e| DocIntelError::Generation {
                provider: "Gemini".to_string(),
                message: format!("failed to parse response: {e}"),
            })?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| DocIntelError::Generation {
                provider: "Gemini".to_string(),
                message: "response contained no candidates".to_string(),
            })?;

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        Ok(text)
    }
}

/// Read the API's error message out of a failed response's body, falling
/// back to the raw body when it is not the documented error shape.
async fn read_error_detail(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ApiErrorResponse>(&body)
        .map(|parsed| parsed.error.message)
        .unwrap_or(body)
}

#[derive(Debug, Serialize)]
struct EmbedBatchRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedBatchResponse {
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
