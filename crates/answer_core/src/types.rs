use std::fmt;

/// Status payload that marks an operation as complete.
pub const FINISHED: &str = "finished";

/// Stable identifier for one tracked answer-generation request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationId(String);

impl OperationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OperationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Status,
    Sources,
    Message,
    Error,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Status => "status",
            EventKind::Sources => "sources",
            EventKind::Message => "message",
            EventKind::Error => "error",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "status" => Some(EventKind::Status),
            "sources" => Some(EventKind::Sources),
            "message" => Some(EventKind::Message),
            "error" => Some(EventKind::Error),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Payload {
    Text(String),
    /// Only carried by `sources` events.
    List(Vec<String>),
}

/// One entry of an operation's update log, or its root summary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpdateEvent {
    pub kind: EventKind,
    pub payload: Payload,
}

impl UpdateEvent {
    pub fn status(label: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Status,
            payload: Payload::Text(label.into()),
        }
    }

    pub fn sources<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: EventKind::Sources,
            payload: Payload::List(names.into_iter().map(Into::into).collect()),
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Message,
            payload: Payload::Text(text.into()),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Error,
            payload: Payload::Text(description.into()),
        }
    }

    /// Text payload, or `None` for list payloads.
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            Payload::List(_) => None,
        }
    }

    /// True for `error` events and for `status: "finished"`.
    pub fn is_stop_signal(&self) -> bool {
        match self.kind {
            EventKind::Error => true,
            EventKind::Status => self.text() == Some(FINISHED),
            EventKind::Sources | EventKind::Message => false,
        }
    }
}

/// One poll response: the root summary plus the full log so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResult {
    pub root: UpdateEvent,
    pub log: Vec<UpdateEvent>,
}

impl PollResult {
    pub fn new(root: UpdateEvent, log: Vec<UpdateEvent>) -> Self {
        Self { root, log }
    }
}

/// Why polling of an operation failed on the client side.
///
/// Failures reported by the operation itself arrive as `error` events and are
/// merged like any other update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Network failure or non-success status.
    Transport(String),
    /// Response body missing or invalid required fields.
    Malformed(String),
    /// Root state did not change within the staleness timeout.
    TimedOut,
}

impl FailureReason {
    /// Transient label shown on the entry once the failure is recorded.
    pub fn status_label(&self) -> &'static str {
        match self {
            FailureReason::Transport(_) | FailureReason::Malformed(_) => "Polling Error",
            FailureReason::TimedOut => "Timeout",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Transport(message) | FailureReason::Malformed(message) => {
                f.write_str(message)
            }
            FailureReason::TimedOut => f.write_str("Response timed out."),
        }
    }
}
