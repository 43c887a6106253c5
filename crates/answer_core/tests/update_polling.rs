use std::sync::Once;
use std::time::{Duration, Instant};

use answer_core::{
    update, AppState, Effect, Msg, PollResult, UpdateEvent, DEFAULT_STALE_TIMEOUT, FINISHED,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(answer_logging::initialize_for_tests);
}

fn tracking(id: &str, at: Instant) -> AppState {
    let (state, _) = update(AppState::new(), Msg::PageSelected("page-1".to_string()));
    let (state, _) = update(state, Msg::InputChanged("Summarize".to_string()));
    let (state, _) = update(state, Msg::QuerySubmitted);
    let (state, _) = update(
        state,
        Msg::OperationStarted {
            operation_id: id.into(),
            at,
        },
    );
    state
}

fn poll(state: AppState, seq: u64, at: Instant, result: PollResult) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::PollCompleted {
            operation_id: "op1".into(),
            seq,
            at,
            result: Ok(result),
        },
    )
}

fn ticks(mut state: AppState, count: usize) -> AppState {
    for _ in 0..count {
        state = update(state, Msg::RenderTick).0;
    }
    state
}

#[test]
fn end_to_end_reading_answering_finished() {
    init_logging();
    let t0 = Instant::now();
    let step = Duration::from_millis(300);
    let state = tracking("op1", t0);

    let mut log = vec![UpdateEvent::status("Reading sources")];
    let (state, effects) = poll(
        state,
        1,
        t0 + step,
        PollResult::new(UpdateEvent::status("Reading sources"), log.clone()),
    );
    assert!(effects.is_empty());
    let view = state.view();
    let answer = view.latest_answer().expect("answer row");
    assert_eq!(answer.live_status.as_deref(), Some("Reading sources"));
    assert!(answer.is_active);

    log.push(UpdateEvent::message("Answer text"));
    let (state, effects) = poll(
        state,
        2,
        t0 + step * 2,
        PollResult::new(UpdateEvent::message("Answer text"), log.clone()),
    );
    assert!(effects.is_empty());
    let entry = state.transcript().answer(&"op1".into()).expect("entry");
    assert_eq!(entry.text, "Answer text");
    assert_eq!(entry.live_status, None);
    assert!(entry.is_active);

    log.push(UpdateEvent::status(FINISHED));
    let (state, effects) = poll(
        state,
        3,
        t0 + step * 3,
        PollResult::new(UpdateEvent::status(FINISHED), log),
    );
    assert_eq!(
        effects,
        vec![Effect::StopPolling {
            operation_id: "op1".into()
        }]
    );
    let entry = state.transcript().answer(&"op1".into()).expect("entry");
    assert!(!entry.is_active);
    assert!(entry.is_terminal);
    assert_eq!(entry.live_status, None);
    assert_eq!(entry.status_history, vec!["Reading sources", FINISHED]);
    assert_eq!(state.view().tracking, None);
    assert_eq!(
        state.view().latest_answer().map(|a| a.displayed_text.clone()),
        Some("Answer text".to_string())
    );
}

#[test]
fn redelivered_result_changes_nothing() {
    init_logging();
    let t0 = Instant::now();
    let result = PollResult::new(
        UpdateEvent::message("Draft"),
        vec![
            UpdateEvent::status("Thinking"),
            UpdateEvent::status("Thinking"),
            UpdateEvent::message("Draft"),
        ],
    );
    let (state, _) = poll(tracking("op1", t0), 1, t0, result.clone());
    let entry_before = state.transcript().answer(&"op1".into()).cloned();
    let watermark_before = state.controller().record(&"op1".into()).map(|r| r.watermark());

    let (state, effects) = poll(state, 2, t0 + Duration::from_millis(300), result);

    assert!(effects.is_empty());
    assert_eq!(state.transcript().answer(&"op1".into()).cloned(), entry_before);
    assert_eq!(
        state.controller().record(&"op1".into()).map(|r| r.watermark()),
        watermark_before
    );
    assert_eq!(
        entry_before.map(|e| e.status_history),
        Some(vec!["Thinking".to_string()])
    );
}

#[test]
fn watermark_is_monotonic_and_bounded_by_log() {
    init_logging();
    let t0 = Instant::now();
    let mut state = tracking("op1", t0);
    let mut log = Vec::new();
    let mut previous = None;

    for (seq, label) in ["a", "b", "b", "c"].into_iter().enumerate() {
        log.push(UpdateEvent::status(label));
        let seq = seq as u64 + 1;
        state = poll(state, seq, t0, PollResult::new(UpdateEvent::status(label), log.clone())).0;
        let last = state
            .controller()
            .record(&"op1".into())
            .and_then(|r| r.watermark().last_merged());
        assert!(last >= previous);
        assert_eq!(last, Some(log.len() - 1));
        previous = last;
    }

    let entry = state.transcript().answer(&"op1".into()).expect("entry");
    assert_eq!(entry.status_history, vec!["a", "b", "c"]);
}

#[test]
fn unchanged_root_times_out_strictly_after_limit() {
    init_logging();
    let t0 = Instant::now();
    let first_seen = t0 + Duration::from_millis(300);
    let stuck = || PollResult::new(UpdateEvent::status("Thinking"), vec![UpdateEvent::status("Thinking")]);

    let (state, _) = poll(tracking("op1", t0), 1, first_seen, stuck());
    let (state, effects) = poll(state, 2, first_seen + DEFAULT_STALE_TIMEOUT, stuck());
    assert!(effects.is_empty());
    assert!(state.view().tracking.is_some());

    let (state, effects) = poll(
        state,
        3,
        first_seen + DEFAULT_STALE_TIMEOUT + Duration::from_millis(1),
        stuck(),
    );

    assert_eq!(
        effects,
        vec![Effect::StopPolling {
            operation_id: "op1".into()
        }]
    );
    let entry = state.transcript().answer(&"op1".into()).expect("entry");
    assert_eq!(entry.failure.as_deref(), Some("Response timed out."));
    assert_eq!(entry.live_status.as_deref(), Some("Timeout"));
    assert!(entry.is_terminal);
}

#[test]
fn progressing_root_never_times_out() {
    init_logging();
    let t0 = Instant::now();
    let mut state = tracking("op1", t0);
    let mut log = Vec::new();
    for seq in 1..=5u64 {
        let text = "x".repeat(seq as usize);
        log.push(UpdateEvent::message(text.clone()));
        let at = t0 + DEFAULT_STALE_TIMEOUT * seq as u32;
        let (next, effects) = poll(state, seq, at, PollResult::new(UpdateEvent::message(text), log.clone()));
        assert!(effects.is_empty());
        state = next;
    }
    assert!(state.view().tracking.is_some());
}

#[test]
fn root_error_records_failure_and_stops() {
    init_logging();
    let t0 = Instant::now();
    let (state, effects) = poll(
        tracking("op1", t0),
        1,
        t0,
        PollResult::new(
            UpdateEvent::error("index unavailable"),
            vec![UpdateEvent::error("index unavailable")],
        ),
    );

    assert_eq!(effects.len(), 1);
    let entry = state.transcript().answer(&"op1".into()).expect("entry");
    assert_eq!(entry.failure.as_deref(), Some("index unavailable"));
    assert_eq!(entry.live_status.as_deref(), Some("Error occurred"));
    assert_eq!(entry.status_history, vec!["Error: index unavailable"]);
    assert!(entry.is_terminal);
}

#[test]
fn text_is_revealed_by_render_ticks_and_snaps_on_finish() {
    init_logging();
    let t0 = Instant::now();
    let mut log = vec![UpdateEvent::message("Hi")];
    let (state, _) = poll(
        tracking("op1", t0),
        1,
        t0,
        PollResult::new(UpdateEvent::message("Hi"), log.clone()),
    );
    let view = state.view();
    assert_eq!(view.latest_answer().map(|a| a.displayed_text.as_str()), Some(""));
    assert!(view.reveal_pending);

    let state = ticks(state, 1);
    assert_eq!(
        state.view().latest_answer().map(|a| a.displayed_text.clone()),
        Some("H".to_string())
    );
    let state = ticks(state, 5);
    assert_eq!(
        state.view().latest_answer().map(|a| a.displayed_text.clone()),
        Some("Hi".to_string())
    );
    assert!(!state.view().reveal_pending);

    log.push(UpdateEvent::message("Hi there"));
    let (state, _) = poll(
        state,
        2,
        t0,
        PollResult::new(UpdateEvent::message("Hi there"), log.clone()),
    );
    let state = ticks(state, 1);
    assert_eq!(
        state.view().latest_answer().map(|a| a.displayed_text.clone()),
        Some("Hi ".to_string())
    );

    log.push(UpdateEvent::status(FINISHED));
    let (state, _) = poll(state, 3, t0, PollResult::new(UpdateEvent::status(FINISHED), log));
    assert_eq!(
        state.view().latest_answer().map(|a| a.displayed_text.clone()),
        Some("Hi there".to_string())
    );
    assert!(!state.view().reveal_pending);
}
