/// Errors returned by the client API and by the stream/decoder layers before
/// they are folded into a terminal `RunFailure`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// An event frame carried a payload that could not be parsed.
    #[error("framing error: {message}")]
    Framing { message: String },
    /// Network or stream I/O failed, or the server rejected the request.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        status_code: Option<u16>,
    },
    /// Invalid user input (for example an empty question).
    #[error("validation error: {0}")]
    Validation(String),
    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// A run was submitted while another run is still in flight.
    #[error("a run is already in progress")]
    Busy,
    /// The run was cancelled through its `AbortHandle`.
    #[error("cancelled")]
    Cancelled,
}

impl ClientError {
    /// Creates a framing error.
    pub fn framing(message: impl Into<String>) -> Self {
        Self::Framing {
            message: message.into(),
        }
    }

    /// Creates a transport error without an HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status_code: None,
        }
    }

    /// Creates a transport error for a non-success HTTP response.
    pub fn http_status(status_code: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status_code: Some(status_code),
        }
    }
}

/// Terminal run failure carried by `RunState::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum RunFailure {
    /// The backend rejected the question or the generated query.
    #[error("{message}")]
    Validation { message: String },
    /// The backend reported an `error` stage.
    #[error("pipeline failure: {message}")]
    Pipeline { message: String },
    /// The event stream carried a malformed frame.
    #[error("framing failure: {message}")]
    Framing { message: String },
    /// The connection failed or stalled.
    #[error("transport failure: {message}")]
    Transport { message: String },
    /// The caller cancelled the run.
    #[error("run cancelled")]
    Cancelled,
}

impl From<&ClientError> for RunFailure {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Framing { message } => RunFailure::Framing {
                message: message.clone(),
            },
            ClientError::Transport { message, .. } => RunFailure::Transport {
                message: message.clone(),
            },
            ClientError::Validation(message) => RunFailure::Validation {
                message: message.clone(),
            },
            ClientError::Cancelled => RunFailure::Cancelled,
            ClientError::Config(message) => RunFailure::Transport {
                message: format!("client misconfigured: {message}"),
            },
            ClientError::Busy => RunFailure::Transport {
                message: "a run is already in progress".into(),
            },
        }
    }
}

/// Why a chart descriptor could not be normalized.
///
/// Never propagated as a fault; the renderer turns it into a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChartDataError {
    #[error("chart descriptor is not an object")]
    NotAnObject,
    #[error("chart descriptor has no `data` object")]
    MissingData,
    #[error("chart `data.labels` is missing or not an array")]
    MissingLabels,
    #[error("chart `data.values` is missing or not an array")]
    MissingValues,
    #[error("pie chart has no series")]
    EmptyPie,
}

/// Error reported by the external plotting collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PlotError(pub String);

/// Error from markdown rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct MarkdownError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_fold_into_matching_run_failures() {
        assert_eq!(
            RunFailure::from(&ClientError::framing("bad json")),
            RunFailure::Framing {
                message: "bad json".into()
            }
        );
        assert_eq!(
            RunFailure::from(&ClientError::http_status(503, "unavailable")),
            RunFailure::Transport {
                message: "unavailable".into()
            }
        );
        assert_eq!(
            RunFailure::from(&ClientError::Cancelled),
            RunFailure::Cancelled
        );
    }

    #[test]
    fn validation_failure_displays_message_verbatim() {
        let failure = RunFailure::Validation {
            message: "Unsupported question".into(),
        };
        assert_eq!(failure.to_string(), "Unsupported question");
    }
}
