use std::time::Instant;

use crate::{FailureReason, OperationId, PollResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The page whose sources answers are generated from.
    PageSelected(String),
    /// User edited the query input.
    InputChanged(String),
    /// User submitted the current query.
    QuerySubmitted,
    /// The server accepted the query and issued an operation id.
    OperationStarted {
        operation_id: OperationId,
        at: Instant,
    },
    /// The start request failed.
    OperationStartFailed { message: String },
    /// One poll round trip finished for `operation_id`.
    PollCompleted {
        operation_id: OperationId,
        /// Per-operation sequence number assigned when the poll was sent.
        seq: u64,
        at: Instant,
        result: Result<PollResult, FailureReason>,
    },
    /// Render tick driving the incremental text reveal.
    RenderTick,
    /// User expanded or collapsed an answer's status history.
    StatusHistoryToggled { operation_id: OperationId },
    /// User cleared the transcript.
    ResetClicked,
    /// Session is being torn down.
    Shutdown,
}
