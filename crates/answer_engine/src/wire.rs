//! JSON bodies exchanged with the answer server.

use answer_core::{EventKind, OperationId, Payload, PollResult, UpdateEvent};
use serde::{Deserialize, Serialize};

use crate::TransportError;

#[derive(Debug, Serialize)]
pub(crate) struct StartRequest<'a> {
    pub query: &'a str,
    pub page_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct StartResponse {
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct WireUpdate {
    #[serde(rename = "type")]
    kind: String,
    content: WireContent,
}

#[derive(Debug, Deserialize)]
struct WirePoll {
    #[serde(rename = "type")]
    kind: String,
    content: WireContent,
    /// Absent on a freshly queued record, before the first update is written.
    #[serde(default)]
    updates: Vec<WireUpdate>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

pub(crate) fn decode_start(body: &[u8]) -> Result<OperationId, TransportError> {
    let response: StartResponse = serde_json::from_slice(body).map_err(malformed)?;
    match response.request_id {
        Some(id) if !id.trim().is_empty() => Ok(OperationId::new(id)),
        _ => Err(TransportError::Malformed(
            "No request_id received from the server.".to_string(),
        )),
    }
}

pub(crate) fn decode_poll(body: &[u8]) -> Result<PollResult, TransportError> {
    let poll: WirePoll = serde_json::from_slice(body).map_err(malformed)?;
    let root = into_event(poll.kind, poll.content)?;
    let log = poll
        .updates
        .into_iter()
        .map(|update| into_event(update.kind, update.content))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PollResult::new(root, log))
}

/// Extracts a human-readable `detail` from an error body, if there is one.
pub(crate) fn decode_detail(body: &[u8]) -> Option<String> {
    let body: ErrorBody = serde_json::from_slice(body).ok()?;
    match body.detail? {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        serde_json::Value::Null | serde_json::Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

fn into_event(kind: String, content: WireContent) -> Result<UpdateEvent, TransportError> {
    let kind = EventKind::parse(&kind)
        .ok_or_else(|| TransportError::Malformed(format!("unknown update type {kind:?}")))?;
    let payload = match (kind, content) {
        (_, WireContent::Text(text)) => Payload::Text(text),
        (EventKind::Sources, WireContent::List(names)) => Payload::List(names),
        (kind, WireContent::List(_)) => {
            return Err(TransportError::Malformed(format!(
                "{kind} update carries a list payload"
            )))
        }
    };
    Ok(UpdateEvent { kind, payload })
}

fn malformed(err: serde_json::Error) -> TransportError {
    TransportError::Malformed(format!("Received invalid data structure from server: {err}"))
}
