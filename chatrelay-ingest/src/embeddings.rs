//! OpenAI-compatible embeddings client.

use crate::error::{ConfigError, IngestError, map_http_status, map_reqwest_error};

/// Default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default embeddings API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding the embedding model.
pub const ENV_EMBEDDING_MODEL: &str = "CHATRELAY_EMBEDDING_MODEL";
/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct EmbeddingsClient {
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) base_url: String,
    /// Requested vector size, for models that support shortening.
    pub(crate) dimensions: Option<usize>,
    pub(crate) client: reqwest::Client,
}

impl EmbeddingsClient {
    /// Create a client with the given API key and default model.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_EMBEDDING_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            dimensions: None,
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build a client from a variable lookup function. Empty values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut client = Self::new(get(ENV_API_KEY).ok_or(ConfigError::MissingVar(ENV_API_KEY))?);
        if let Some(model) = get(ENV_EMBEDDING_MODEL) {
            client.model = model;
        }
        if let Some(url) = get(ENV_BASE_URL) {
            client.base_url = url;
        }
        Ok(client)
    }

    /// Override the embedding model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL (mock servers, proxies, compatible hosts).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Request vectors of a specific size.
    #[must_use]
    pub fn dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Use a preconfigured [`reqwest::Client`].
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Build the embeddings endpoint URL.
    pub(crate) fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url.trim_end_matches('/'))
    }

    /// Embed `inputs`, returning one vector per input in input order.
    pub async fn embed(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>, IngestError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let expected = inputs.len();

        let mut body = serde_json::json!({
            "model": self.model,
            "input": inputs,
            "encoding_format": "float",
        });
        if let Some(dims) = self.dimensions {
            body["dimensions"] = serde_json::json!(dims);
        }

        let url = self.embeddings_url();
        tracing::debug!(url = %url, model = %self.model, inputs = expected, "sending embedding request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let response_text = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            return Err(map_http_status(status, &response_text));
        }

        let json: serde_json::Value = serde_json::from_str(&response_text)
            .map_err(|e| IngestError::InvalidResponse(format!("invalid JSON response: {e}")))?;

        parse_embedding_response(&json, expected)
    }
}

/// Extract embedding vectors from an embeddings API response, ordered by `index`.
fn parse_embedding_response(
    json: &serde_json::Value,
    expected: usize,
) -> Result<Vec<Vec<f32>>, IngestError> {
    let data = json["data"]
        .as_array()
        .ok_or_else(|| IngestError::InvalidResponse("missing 'data' array".into()))?;

    if data.len() != expected {
        return Err(IngestError::InvalidResponse(format!(
            "expected {expected} embeddings, got {}",
            data.len()
        )));
    }

    // Each input index must be filled exactly once.
    let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];
    for (position, item) in data.iter().enumerate() {
        let index = item["index"].as_u64().map_or(position, |i| i as usize);
        let slot = slots.get_mut(index).ok_or_else(|| {
            IngestError::InvalidResponse(format!(
                "embedding index {index} out of range for {expected} inputs"
            ))
        })?;
        if slot.is_some() {
            return Err(IngestError::InvalidResponse(format!(
                "duplicate embedding index {index}"
            )));
        }

        let values = item["embedding"].as_array().ok_or_else(|| {
            IngestError::InvalidResponse(format!("missing 'embedding' at position {position}"))
        })?;
        let vector = values
            .iter()
            .map(|v| {
                v.as_f64().map(|f| f as f32).ok_or_else(|| {
                    IngestError::InvalidResponse(format!(
                        "non-numeric embedding value at position {position}"
                    ))
                })
            })
            .collect::<Result<Vec<f32>, _>>()?;
        *slot = Some(vector);
    }

    slots
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| IngestError::InvalidResponse("missing embedding index".into()))
}
