use std::time::{Duration, Instant};

use crate::types::{Payload, UpdateEvent};
use crate::EventKind;

/// Comparable fingerprint of a root summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    kind: EventKind,
    payload: Payload,
}

impl Signature {
    pub fn of(root: &UpdateEvent) -> Self {
        Self {
            kind: root.kind,
            payload: root.payload.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Changed,
    Unchanged { idle: Duration },
    TimedOut,
}

/// Detects an operation whose root summary stops changing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalenessDetector {
    timeout: Duration,
    signature: Option<Signature>,
    changed_at: Instant,
}

impl StalenessDetector {
    pub fn new(timeout: Duration, now: Instant) -> Self {
        Self {
            timeout,
            signature: None,
            changed_at: now,
        }
    }

    /// Forgets the last signature and restarts the idle clock at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.signature = None;
        self.changed_at = now;
    }

    pub fn observe(&mut self, root: &UpdateEvent, now: Instant) -> Staleness {
        let signature = Signature::of(root);
        if self.signature.as_ref() != Some(&signature) {
            self.signature = Some(signature);
            self.changed_at = now;
            return Staleness::Changed;
        }

        let idle = now.saturating_duration_since(self.changed_at);
        if idle > self.timeout {
            Staleness::TimedOut
        } else {
            Staleness::Unchanged { idle }
        }
    }
}
