//! Folds poll results into a transcript entry.
//!
//! Merging runs in two passes. The log catch-up pass applies every log entry
//! past the watermark exactly once, building the status history and picking
//! the newest answer text. The root pass then overrides the transient fields
//! with the root summary, which may be one cycle ahead of the log.

use answer_logging::answer_warn;

use crate::types::{EventKind, Payload, PollResult, UpdateEvent, FINISHED};
use crate::TranscriptEntry;

/// Highest log index already merged for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Watermark(Option<usize>);

impl Watermark {
    /// Watermark positioned before index 0.
    pub fn before_start() -> Self {
        Self(None)
    }

    pub fn last_merged(&self) -> Option<usize> {
        self.0
    }

    fn next_index(&self) -> usize {
        self.0.map_or(0, |index| index + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Number of log entries applied this round.
    pub merged: usize,
    /// A stop condition was seen in the new log entries or the root.
    pub stop: bool,
}

pub fn merge_poll_result(
    entry: &mut TranscriptEntry,
    watermark: &mut Watermark,
    result: &PollResult,
) -> MergeOutcome {
    let start = watermark.next_index();
    if start > result.log.len() {
        answer_warn!(
            "log for {} shrank to {} entries below watermark {:?}",
            entry.id,
            result.log.len(),
            watermark.last_merged()
        );
    }

    let mut stop = false;
    let mut pending_text: Option<&str> = None;
    let mut merged = 0;
    for event in result.log.iter().skip(start) {
        match event.kind {
            EventKind::Status => {
                if let Some(label) = event.text() {
                    entry.push_status(label.to_string());
                }
            }
            EventKind::Sources => entry.push_status(sources_label(event)),
            EventKind::Message => pending_text = event.text(),
            EventKind::Error => {
                let description = event.text().unwrap_or_default();
                entry.push_status(format!("Error: {description}"));
                if entry.failure.is_none() {
                    entry.failure = Some(description.to_string());
                }
            }
        }
        stop |= event.is_stop_signal();
        merged += 1;
    }

    if merged > 0 {
        *watermark = Watermark(Some(result.log.len() - 1));
    }
    if let Some(text) = pending_text {
        entry.text = text.to_string();
    }

    reconcile_root(entry, &result.root);
    stop |= result.root.is_stop_signal();

    if stop {
        if entry.live_status.as_deref() == Some(FINISHED) {
            entry.live_status = None;
        }
        entry.freeze();
    }

    MergeOutcome { merged, stop }
}

fn reconcile_root(entry: &mut TranscriptEntry, root: &UpdateEvent) {
    match root.kind {
        EventKind::Message => {
            entry.live_status = None;
            entry.is_active = true;
        }
        EventKind::Status => {
            let label = root.text().unwrap_or_default();
            entry.is_active = label != FINISHED;
            entry.live_status = Some(label.to_string());
        }
        EventKind::Error => {
            entry.failure = Some(root.text().unwrap_or_default().to_string());
            entry.live_status = Some("Error occurred".to_string());
            entry.is_active = false;
        }
        // Source lists only feed the history.
        EventKind::Sources => {}
    }
}

fn sources_label(event: &UpdateEvent) -> String {
    match &event.payload {
        Payload::List(names) if !names.is_empty() => {
            format!("Reading source: {}", names.join(", "))
        }
        _ => "Processing sources...".to_string(),
    }
}
