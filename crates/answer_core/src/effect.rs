use std::time::Duration;

use crate::OperationId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the server to start answering `query` against `page_id`.
    StartOperation { query: String, page_id: String },
    /// Arm the poll timer for `operation_id`, replacing any armed timer.
    StartPolling {
        operation_id: OperationId,
        interval: Duration,
    },
    /// Disarm the poll timer for `operation_id`.
    StopPolling { operation_id: OperationId },
    /// Session teardown.
    Shutdown,
}
