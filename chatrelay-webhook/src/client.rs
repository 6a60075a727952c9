//! Webhook client struct and builder.

use chatrelay_stream::{DecodedReply, ReplyEvent, ReplyStream};
use futures::StreamExt;

use crate::error::{ConfigError, RelayError, map_http_status, map_reqwest_error};
use crate::types::ChatRequest;

/// Environment variable holding the webhook URL.
pub const ENV_WEBHOOK_URL: &str = "CHATRELAY_WEBHOOK_URL";
/// Environment variable holding the default agent name.
pub const ENV_AGENT: &str = "CHATRELAY_AGENT";
/// Environment variable holding an optional bearer token.
pub const ENV_WEBHOOK_TOKEN: &str = "CHATRELAY_WEBHOOK_TOKEN";

/// Content types the decoder understands, in order of preference.
const ACCEPT: &str = "text/event-stream, application/x-ndjson, application/json";

/// Client for a chat webhook that streams its replies.
///
/// # Example
///
/// ```no_run
/// use chatrelay_webhook::{ChatRequest, WebhookClient, new_session_id};
///
/// # async fn run() -> Result<(), chatrelay_webhook::RelayError> {
/// let client = WebhookClient::new("https://hooks.example.com/webhook/niko/chat")
///     .agent("niko");
/// let reply = client
///     .send_and_collect(ChatRequest::new(new_session_id(), "Hello"), |text| {
///         println!("{text}");
///     })
///     .await?;
/// println!("title: {:?}", reply.title);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WebhookClient {
    /// Full webhook URL messages are POSTed to.
    pub(crate) endpoint: String,
    /// Optional bearer token sent as `Authorization`.
    pub(crate) bearer_token: Option<String>,
    /// Agent name applied to requests that do not name one.
    pub(crate) agent: Option<String>,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl WebhookClient {
    /// Create a client for the given webhook URL.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            bearer_token: None,
            agent: None,
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from `CHATRELAY_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build a client from a variable lookup function.
    ///
    /// Empty values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let endpoint = get(ENV_WEBHOOK_URL).ok_or(ConfigError::MissingVar(ENV_WEBHOOK_URL))?;
        let endpoint = endpoint.trim().to_string();
        match reqwest::Url::parse(&endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::InvalidUrl(endpoint)),
        }

        let mut client = Self::new(endpoint);
        client.agent = get(ENV_AGENT);
        client.bearer_token = get(ENV_WEBHOOK_TOKEN);
        Ok(client)
    }

    /// Send `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Default agent for requests that do not name one.
    #[must_use]
    pub fn agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Use a preconfigured [`reqwest::Client`] (proxies, TLS roots, timeouts).
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// The webhook URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Relay a message and return the decoding reply stream.
    ///
    /// A non-success status is returned as an error before anything is
    /// decoded. Failures after the body started streaming arrive as a
    /// [`ReplyEvent::Error`] on the returned stream.
    pub async fn send_message(&self, mut request: ChatRequest) -> Result<ReplyStream, RelayError> {
        if request.agent.is_none() {
            request.agent = self.agent.clone();
        }

        tracing::debug!(
            url = %self.endpoint,
            session_id = %request.session_id,
            agent = ?request.agent,
            "relaying chat message"
        );

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("accept", ACCEPT)
            .json(&request);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.map_err(map_reqwest_error)?;
            return Err(map_http_status(status, &body_text));
        }

        Ok(ReplyStream::from_bytes_stream(response.bytes_stream()))
    }

    /// Relay a message and drive its reply to completion.
    ///
    /// `on_update` receives the full running reply text after every fragment.
    pub async fn send_and_collect(
        &self,
        request: ChatRequest,
        mut on_update: impl FnMut(&str),
    ) -> Result<DecodedReply, RelayError> {
        let mut stream = self.send_message(request).await?;

        while let Some(event) = stream.receiver.next().await {
            match event {
                ReplyEvent::Update(text) => on_update(&text),
                ReplyEvent::Complete(reply) => return Ok(reply),
                ReplyEvent::Error(e) => return Err(RelayError::Stream(e.message)),
            }
        }

        Err(RelayError::Stream(
            "reply stream ended without completion".into(),
        ))
    }
}
