use std::time::Duration;

use crate::errors::ClientError;
use crate::frame::DEFAULT_EVENT_PREFIX;

/// Status texts shown while a run progresses.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StatusMessages {
    pub thinking: String,
    pub validate_sql: String,
    pub execute_sql: String,
    pub visualizer: String,
    pub formatter: String,
    pub insight: String,
    pub done: String,
    pub framing_failure: String,
    pub transport_failure: String,
    pub cancelled: String,
    /// Prefix for the text of a backend `error` stage.
    pub pipeline_failure_prefix: String,
}

impl Default for StatusMessages {
    fn default() -> Self {
        Self {
            thinking: "Thinking \u{1F914}...".into(),
            validate_sql: "Checking the data query \u{1F9D0}...".into(),
            execute_sql: "Retrieving data \u{1F4BE}...".into(),
            visualizer: "Designing the chart \u{1F3A8}...".into(),
            formatter: "Preparing the chart \u{2728}...".into(),
            insight: "Analyzing results for insights \u{1F4A1}...".into(),
            done: "Done!".into(),
            framing_failure: "Received a malformed update from the server.".into(),
            transport_failure: "Connection to server failed.".into(),
            cancelled: "Request cancelled.".into(),
            pipeline_failure_prefix: "An error occurred: ".into(),
        }
    }
}

/// Configuration for the streaming pipeline client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the pipeline server.
    pub base_url: String,
    /// Path of the streaming endpoint.
    pub endpoint: String,
    /// Whole-request timeout. `None` waits for the server to close the stream.
    pub timeout: Option<Duration>,
    /// Longest silence tolerated between two chunks. `None` disables the check.
    pub idle_timeout: Option<Duration>,
    /// Prefix of lines that carry an event.
    pub event_prefix: String,
    pub status: StatusMessages,
}

impl ClientConfig {
    /// Creates a config with defaults for the given server.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint: "/stream-agent".to_string(),
            timeout: None,
            idle_timeout: None,
            event_prefix: DEFAULT_EVENT_PREFIX.to_string(),
            status: StatusMessages::default(),
        }
    }

    /// Builds a config from the environment.
    ///
    /// - `PIPELINE_STREAM_BASE_URL` (required)
    /// - `PIPELINE_STREAM_ENDPOINT`
    /// - `PIPELINE_STREAM_IDLE_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("PIPELINE_STREAM_BASE_URL").unwrap_or_default();
        if base_url.trim().is_empty() {
            return Err(ClientError::Config("missing PIPELINE_STREAM_BASE_URL".into()));
        }
        let mut config = Self::new(base_url.trim());
        if let Ok(endpoint) = std::env::var("PIPELINE_STREAM_ENDPOINT")
            && !endpoint.trim().is_empty()
        {
            config = config.endpoint(endpoint.trim());
        }
        if let Ok(raw) = std::env::var("PIPELINE_STREAM_IDLE_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!(
                    "PIPELINE_STREAM_IDLE_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"
                ))
            })?;
            config = config.idle_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Overrides the endpoint path.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets a whole-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the idle timeout between chunks.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Overrides the event line prefix.
    pub fn event_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.event_prefix = prefix.into();
        self
    }

    /// Replaces the status texts.
    pub fn status(mut self, status: StatusMessages) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn stream_url(&self) -> String {
        let endpoint = self.endpoint.trim_start_matches('/');
        format!("{}/{endpoint}", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn validate(&self) -> Result<(), ClientError> {
        if self.base_url.trim().is_empty() {
            return Err(ClientError::Config("base_url must not be empty".into()));
        }
        if self.event_prefix.is_empty() {
            return Err(ClientError::Config("event_prefix must not be empty".into()));
        }
        if self.idle_timeout == Some(Duration::ZERO) {
            return Err(ClientError::Config("idle_timeout must be greater than zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_url_joins_without_double_slashes() {
        assert_eq!(
            ClientConfig::new("http://localhost:8000/").stream_url(),
            "http://localhost:8000/stream-agent"
        );
        assert_eq!(
            ClientConfig::new("http://host").endpoint("api/run").stream_url(),
            "http://host/api/run"
        );
    }

    #[test]
    fn validate_rejects_unusable_settings() {
        assert!(ClientConfig::new("http://host").validate().is_ok());
        assert!(matches!(
            ClientConfig::new("  ").validate(),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::new("http://host").event_prefix("").validate(),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::new("http://host").idle_timeout(Duration::ZERO).validate(),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn status_messages_deserialize_with_defaults() {
        let status: StatusMessages =
            serde_json::from_str(r#"{"done": "Finished."}"#).expect("status");
        assert_eq!(status.done, "Finished.");
        assert_eq!(status.thinking, StatusMessages::default().thinking);
    }
}
