use std::time::Instant;

use answer_logging::{answer_debug, answer_info, answer_warn};

use crate::controller::Admission;
use crate::merge::merge_poll_result;
use crate::staleness::Staleness;
use crate::transcript::{TranscriptEntry, TranscriptItem};
use crate::{AppState, Effect, FailureReason, Msg, OperationId, PollResult};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageSelected(page_id) => {
            let page_id = page_id.trim().to_string();
            state.page_id = (!page_id.is_empty()).then_some(page_id);
            state.mark_dirty();
            Vec::new()
        }
        Msg::InputChanged(text) => {
            if state.input != text {
                state.input = text;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::QuerySubmitted => submit_query(&mut state),
        Msg::OperationStarted { operation_id, at } => begin_tracking(&mut state, operation_id, at),
        Msg::OperationStartFailed { message } => {
            state.start_pending = false;
            let message = if message.trim().is_empty() {
                "Could not start chat.".to_string()
            } else {
                message
            };
            answer_warn!("start request failed: {}", message);
            state.transcript.push(TranscriptItem::StartFailed { message });
            state.mark_dirty();
            Vec::new()
        }
        Msg::PollCompleted {
            operation_id,
            seq,
            at,
            result,
        } => apply_poll(&mut state, operation_id, seq, at, result),
        Msg::RenderTick => {
            if state.typewriter.tick() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::StatusHistoryToggled { operation_id } => {
            if state.transcript.answer(&operation_id).is_some() {
                if state.expanded_history.as_ref() == Some(&operation_id) {
                    state.expanded_history = None;
                } else {
                    state.expanded_history = Some(operation_id);
                }
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ResetClicked => {
            let effects = stop_tracking(&mut state, None);
            state.transcript.clear();
            state.controller.clear();
            state.typewriter.restart();
            state.revealing = None;
            state.expanded_history = None;
            state.mark_dirty();
            effects
        }
        Msg::Shutdown => {
            let mut effects = stop_tracking(&mut state, None);
            effects.push(Effect::Shutdown);
            effects
        }
    };

    (state, effects)
}

fn submit_query(state: &mut AppState) -> Vec<Effect> {
    let query = state.input.trim().to_string();
    if query.is_empty() || state.start_pending {
        return Vec::new();
    }
    let Some(page_id) = state.page_id.clone() else {
        answer_warn!("query submitted without a page id; ignoring");
        return Vec::new();
    };

    state.input.clear();
    state.start_pending = true;
    state.transcript.push(TranscriptItem::Query {
        text: query.clone(),
    });
    state.mark_dirty();
    vec![Effect::StartOperation { query, page_id }]
}

fn begin_tracking(state: &mut AppState, operation_id: OperationId, at: Instant) -> Vec<Effect> {
    state.start_pending = false;
    if state.controller.is_current(&operation_id) {
        answer_debug!("operation {} is already tracked", operation_id);
        return Vec::new();
    }

    let mut effects = Vec::with_capacity(2);
    if let Some(previous) = state.controller.start(operation_id.clone(), at) {
        answer_info!("operation {} interrupted by {}", previous, operation_id);
        if let Some(entry) = state.transcript.answer_mut(&previous) {
            entry.freeze();
        }
        effects.push(Effect::StopPolling {
            operation_id: previous,
        });
    }

    answer_info!("tracking operation {}", operation_id);
    state
        .transcript
        .push(TranscriptItem::Answer(TranscriptEntry::new(operation_id.clone())));
    state.typewriter.restart();
    state.revealing = Some(operation_id.clone());
    state.sync_reveal();
    state.mark_dirty();

    effects.push(Effect::StartPolling {
        operation_id,
        interval: state.settings.poll_interval,
    });
    effects
}

fn apply_poll(
    state: &mut AppState,
    operation_id: OperationId,
    seq: u64,
    at: Instant,
    result: Result<PollResult, FailureReason>,
) -> Vec<Effect> {
    match state.controller.admit(&operation_id, seq) {
        Admission::Accepted => {}
        Admission::NotCurrent => {
            answer_debug!("discarding poll #{} for untracked operation {}", seq, operation_id);
            return Vec::new();
        }
        Admission::OutOfOrder => {
            answer_debug!("discarding out-of-order poll #{} for {}", seq, operation_id);
            return Vec::new();
        }
    }

    let poll = match result {
        Ok(poll) => poll,
        Err(reason) => {
            answer_warn!("poll for {} failed: {}", operation_id, reason);
            record_failure(state, &operation_id, reason);
            return stop_tracking(state, Some(at));
        }
    };

    let (Some(record), Some(entry)) = (
        state.controller.record_mut(&operation_id),
        state.transcript.answer_mut(&operation_id),
    ) else {
        return stop_tracking(state, Some(at));
    };

    if record.staleness.observe(&poll.root, at) == Staleness::TimedOut {
        answer_warn!("operation {} stalled; giving up", operation_id);
        record_failure(state, &operation_id, FailureReason::TimedOut);
        return stop_tracking(state, Some(at));
    }

    let before = record.watermark;
    let outcome = merge_poll_result(entry, &mut record.watermark, &poll);
    answer_debug!(
        "poll #{} for {}: merged {} entries ({:?} -> {:?})",
        seq,
        operation_id,
        outcome.merged,
        before.last_merged(),
        record.watermark.last_merged()
    );
    state.sync_reveal();
    state.mark_dirty();

    if outcome.stop {
        answer_info!("stop condition met for {}", operation_id);
        stop_tracking(state, Some(at))
    } else {
        Vec::new()
    }
}

fn record_failure(state: &mut AppState, operation_id: &OperationId, reason: FailureReason) {
    if let Some(entry) = state.transcript.answer_mut(operation_id) {
        entry.live_status = Some(reason.status_label().to_string());
        entry.failure = Some(reason.to_string());
        entry.freeze();
    }
}

/// Single teardown path for stop conditions, failures, reset and shutdown.
///
/// `at` is the time of the message that ended tracking, when it carries one.
fn stop_tracking(state: &mut AppState, at: Option<Instant>) -> Vec<Effect> {
    let tracked_for = state
        .controller
        .current()
        .and_then(|id| state.controller.record(id))
        .zip(at)
        .map(|(record, at)| record.tracked_for(at));
    let Some(operation_id) = state.controller.stop() else {
        return Vec::new();
    };

    if let Some(entry) = state.transcript.answer_mut(&operation_id) {
        entry.freeze();
    }
    state.sync_reveal();
    state.mark_dirty();
    answer_info!("stopped tracking {} after {:?}", operation_id, tracked_for);
    vec![Effect::StopPolling { operation_id }]
}
