use futures::StreamExt as _;
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::stream::ByteStream;

/// One question submitted to the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QueryRequest {
    pub question: String,
    /// Anti-abuse field forwarded untouched.
    #[serde(default)]
    pub honeypot: Option<String>,
    /// Bot-mitigation token forwarded untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recaptcha_token: Option<String>,
}

impl QueryRequest {
    /// Creates a request for `question`.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            honeypot: None,
            recaptcha_token: None,
        }
    }

    /// Sets the honeypot field.
    pub fn honeypot(mut self, value: impl Into<String>) -> Self {
        self.honeypot = Some(value.into());
        self
    }

    /// Sets the bot-mitigation token.
    pub fn recaptcha_token(mut self, token: impl Into<String>) -> Self {
        self.recaptcha_token = Some(token.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ClientError> {
        if self.question.trim().is_empty() {
            return Err(ClientError::Validation("Please enter a question.".into()));
        }
        Ok(())
    }
}

/// Transport that opens the event stream for a request.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// Sends the request and returns the response body as a byte stream.
    async fn open(&self, request: &QueryRequest) -> Result<ByteStream, ClientError>;
}

/// `EventSource` backed by an HTTP POST with a streamed response body.
pub struct HttpEventSource {
    client: reqwest::Client,
    url: String,
}

impl HttpEventSource {
    /// Builds the HTTP client for `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: config.stream_url(),
        })
    }
}

#[async_trait::async_trait]
impl EventSource for HttpEventSource {
    async fn open(&self, request: &QueryRequest) -> Result<ByteStream, ClientError> {
        debug!(url = %self.url, "opening event stream");
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::http_status(
                status.as_u16(),
                format!("server responded with status {status}: {body}"),
            ));
        }

        Ok(Box::pin(response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| ClientError::transport(format!("stream read failed: {e}")))
        })))
    }
}
