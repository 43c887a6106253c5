use std::fmt;
use std::time::Duration;

use answer_core::{OperationId, PollResult};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Which call a transport error came from; selects the fallback wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    Poll,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::Poll => write!(f, "poll"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("{detail}")]
    Status { status: u16, detail: String },
    #[error("{0}")]
    Malformed(String),
}

impl TransportError {
    /// Builds a status error, preferring the server's `detail` over the generic wording.
    pub(crate) fn status(endpoint: Endpoint, status: u16, detail: Option<String>) -> Self {
        let detail = detail.unwrap_or_else(|| match endpoint {
            Endpoint::Start => format!("Failed to initiate chat (Status: {status})"),
            Endpoint::Poll => format!("Polling failed with status {status}"),
        });
        TransportError::Status { status, detail }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, TransportError::Malformed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    OperationStarted {
        operation_id: OperationId,
    },
    OperationStartFailed {
        error: TransportError,
    },
    Polled {
        operation_id: OperationId,
        seq: u64,
        result: Result<PollResult, TransportError>,
    },
}
