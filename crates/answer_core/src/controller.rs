use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::merge::Watermark;
use crate::staleness::StalenessDetector;
use crate::OperationId;

/// Bookkeeping for the operation currently being tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingRecord {
    pub(crate) watermark: Watermark,
    pub(crate) staleness: StalenessDetector,
    pub(crate) started_at: Instant,
    last_seq: Option<u64>,
}

impl TrackingRecord {
    fn new(stale_timeout: Duration, now: Instant) -> Self {
        Self {
            watermark: Watermark::before_start(),
            staleness: StalenessDetector::new(stale_timeout, now),
            started_at: now,
            last_seq: None,
        }
    }

    pub fn watermark(&self) -> Watermark {
        self.watermark
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Time spent tracking as of `at`. Zero if `at` predates the start.
    pub fn tracked_for(&self, at: Instant) -> Duration {
        at.saturating_duration_since(self.started_at)
    }
}

/// Whether a poll result may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// The result belongs to an operation that is no longer tracked.
    NotCurrent,
    /// A newer result for the same operation was already applied.
    OutOfOrder,
}

/// Owner of "which operation is tracked right now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLifecycleController {
    stale_timeout: Duration,
    current: Option<OperationId>,
    records: BTreeMap<OperationId, TrackingRecord>,
}

impl RequestLifecycleController {
    pub fn new(stale_timeout: Duration) -> Self {
        Self {
            stale_timeout,
            current: None,
            records: BTreeMap::new(),
        }
    }

    pub fn current(&self) -> Option<&OperationId> {
        self.current.as_ref()
    }

    pub fn is_current(&self, operation_id: &OperationId) -> bool {
        self.current.as_ref() == Some(operation_id)
    }

    /// Begins tracking `operation_id` with a fresh record.
    ///
    /// Returns the previously tracked operation if it was interrupted.
    pub fn start(&mut self, operation_id: OperationId, now: Instant) -> Option<OperationId> {
        let interrupted = match self.current.take() {
            Some(previous) if previous != operation_id => {
                self.records.remove(&previous);
                Some(previous)
            }
            _ => None,
        };
        self.records.insert(
            operation_id.clone(),
            TrackingRecord::new(self.stale_timeout, now),
        );
        self.current = Some(operation_id);
        interrupted
    }

    /// Releases the current operation. Calling it again is a no-op.
    pub fn stop(&mut self) -> Option<OperationId> {
        let stopped = self.current.take()?;
        self.records.remove(&stopped);
        Some(stopped)
    }

    /// Checks a result's operation id and sequence number before it is applied.
    pub fn admit(&mut self, operation_id: &OperationId, seq: u64) -> Admission {
        if !self.is_current(operation_id) {
            return Admission::NotCurrent;
        }
        let Some(record) = self.records.get_mut(operation_id) else {
            return Admission::NotCurrent;
        };
        if record.last_seq.is_some_and(|last| seq <= last) {
            return Admission::OutOfOrder;
        }
        record.last_seq = Some(seq);
        Admission::Accepted
    }

    pub fn record(&self, operation_id: &OperationId) -> Option<&TrackingRecord> {
        self.records.get(operation_id)
    }

    pub(crate) fn record_mut(&mut self, operation_id: &OperationId) -> Option<&mut TrackingRecord> {
        self.records.get_mut(operation_id)
    }

    /// Drops every record, including the current one.
    pub(crate) fn clear(&mut self) {
        self.current = None;
        self.records.clear();
    }
}
