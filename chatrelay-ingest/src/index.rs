//! Vector index client (Pinecone-compatible data plane).

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ConfigError, IngestError, map_http_status, map_reqwest_error};

/// Environment variable holding the index host.
pub const ENV_INDEX_HOST: &str = "VECTOR_INDEX_HOST";
/// Environment variable holding the index API key.
pub const ENV_INDEX_API_KEY: &str = "VECTOR_INDEX_API_KEY";
/// Environment variable selecting the namespace.
pub const ENV_INDEX_NAMESPACE: &str = "VECTOR_INDEX_NAMESPACE";

/// One vector to upsert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vector {
    /// Record id; upserting an existing id replaces it.
    pub id: String,
    /// Embedding values.
    pub values: Vec<f32>,
    /// Filterable metadata stored with the vector.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

/// Client for an index's `/vectors/upsert` endpoint.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    pub(crate) host: String,
    pub(crate) api_key: String,
    pub(crate) namespace: Option<String>,
    pub(crate) client: reqwest::Client,
}

impl VectorIndex {
    /// Create a client for the index at `host`.
    ///
    /// A host without a scheme is assumed to be `https://`.
    #[must_use]
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        let host = host.into();
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host
        } else {
            format!("https://{host}")
        };
        Self {
            host,
            api_key: api_key.into(),
            namespace: None,
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

        let host = get(ENV_INDEX_HOST).ok_or(ConfigError::MissingVar(ENV_INDEX_HOST))?;
        let api_key = get(ENV_INDEX_API_KEY).ok_or(ConfigError::MissingVar(ENV_INDEX_API_KEY))?;

        let mut index = Self::new(host.trim(), api_key);
        index.namespace = get(ENV_INDEX_NAMESPACE);
        Ok(index)
    }

    /// Write into a namespace instead of the default one.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Use a preconfigured [`reqwest::Client`].
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Build the upsert endpoint URL.
    pub(crate) fn upsert_url(&self) -> String {
        format!("{}/vectors/upsert", self.host.trim_end_matches('/'))
    }

    /// Upsert `vectors` and return how many the index reports as written.
    pub async fn upsert(&self, vectors: Vec<Vector>) -> Result<usize, IngestError> {
        if vectors.is_empty() {
            return Ok(0);
        }
        let count = vectors.len();

        let mut body = serde_json::json!({ "vectors": vectors });
        if let Some(ns) = &self.namespace {
            body["namespace"] = serde_json::json!(ns);
        }

        let url = self.upsert_url();
        tracing::debug!(url = %url, namespace = ?self.namespace, count, "upserting vectors");

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
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

        json["upsertedCount"]
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| IngestError::InvalidResponse("missing 'upsertedCount'".into()))
    }
}
