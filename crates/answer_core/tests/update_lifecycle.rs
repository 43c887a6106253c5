use std::sync::Once;
use std::time::{Duration, Instant};

use answer_core::{
    update, AppState, Effect, FailureReason, Msg, OperationId, PollResult, TranscriptRowView,
    UpdateEvent, DEFAULT_POLL_INTERVAL, INITIAL_STATUS,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(answer_logging::initialize_for_tests);
}

fn with_page() -> AppState {
    let (state, _) = update(AppState::new(), Msg::PageSelected("page-1".to_string()));
    state
}

fn submit(state: AppState, query: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(query.to_string()));
    update(state, Msg::QuerySubmitted)
}

fn started(state: AppState, id: &str, at: Instant) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::OperationStarted {
            operation_id: id.into(),
            at,
        },
    )
}

fn polled(state: AppState, id: &str, seq: u64, at: Instant, result: PollResult) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::PollCompleted {
            operation_id: id.into(),
            seq,
            at,
            result: Ok(result),
        },
    )
}

#[test]
fn submit_trims_query_and_requests_start() {
    init_logging();
    let (mut state, effects) = submit(with_page(), "  What is this page about?  \n");

    assert_eq!(
        effects,
        vec![Effect::StartOperation {
            query: "What is this page about?".to_string(),
            page_id: "page-1".to_string(),
        }]
    );
    let view = state.view();
    assert!(view.busy);
    assert_eq!(view.input, "");
    assert_eq!(
        view.rows,
        vec![TranscriptRowView::Query {
            text: "What is this page about?".to_string()
        }]
    );
    assert!(state.consume_dirty());
}

#[test]
fn submit_ignores_blank_input_missing_page_and_pending_start() {
    init_logging();
    let (_, effects) = submit(with_page(), "   \n");
    assert!(effects.is_empty());

    let (_, effects) = submit(AppState::new(), "question");
    assert!(effects.is_empty());

    let (state, _) = submit(with_page(), "first");
    let (state, effects) = submit(state, "second");
    assert!(effects.is_empty());
    assert_eq!(state.view().rows.len(), 1);
}

#[test]
fn operation_started_creates_active_entry_and_arms_poller() {
    init_logging();
    let (state, _) = submit(with_page(), "q");
    let (state, effects) = started(state, "op1", Instant::now());

    assert_eq!(
        effects,
        vec![Effect::StartPolling {
            operation_id: "op1".into(),
            interval: DEFAULT_POLL_INTERVAL,
        }]
    );
    let view = state.view();
    let answer = view.latest_answer().expect("answer row");
    assert_eq!(answer.operation_id, OperationId::from("op1"));
    assert_eq!(answer.live_status.as_deref(), Some(INITIAL_STATUS));
    assert!(answer.is_active);
    assert!(!answer.is_terminal);
    assert_eq!(view.tracking, Some("op1".into()));
}

#[test]
fn new_operation_interrupts_and_freezes_the_previous_one() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = submit(with_page(), "first");
    let (state, _) = started(state, "op1", t0);
    let (state, _) = polled(
        state,
        "op1",
        1,
        t0,
        PollResult::new(
            UpdateEvent::message("Half an ans"),
            vec![UpdateEvent::message("Half an ans")],
        ),
    );

    let (state, effects) = started(state, "op2", t0);

    assert_eq!(
        effects,
        vec![
            Effect::StopPolling {
                operation_id: "op1".into()
            },
            Effect::StartPolling {
                operation_id: "op2".into(),
                interval: DEFAULT_POLL_INTERVAL,
            },
        ]
    );
    let view = state.view();
    let old = view.answer(&"op1".into()).expect("old answer");
    assert!(!old.is_active);
    assert!(old.is_terminal);
    assert_eq!(old.failure, None);
    assert_eq!(old.displayed_text, "Half an ans");
    assert_eq!(view.tracking, Some("op2".into()));
}

#[test]
fn late_result_for_interrupted_operation_is_discarded() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = started(with_page(), "op1", t0);
    let (state, _) = started(state, "op2", t0);
    let before = state.view();

    let (state, effects) = polled(
        state,
        "op1",
        1,
        t0,
        PollResult::new(UpdateEvent::message("late"), vec![UpdateEvent::message("late")]),
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().rows, before.rows);
}

#[test]
fn result_after_stop_does_not_mutate_transcript() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = started(with_page(), "op1", t0);
    let (state, effects) = update(state, Msg::Shutdown);
    assert_eq!(
        effects,
        vec![
            Effect::StopPolling {
                operation_id: "op1".into()
            },
            Effect::Shutdown,
        ]
    );
    let frozen = state.view().rows;

    let (state, effects) = polled(
        state,
        "op1",
        1,
        t0,
        PollResult::new(UpdateEvent::status("finished"), vec![UpdateEvent::status("finished")]),
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().rows, frozen);
}

#[test]
fn shutdown_twice_only_stops_once() {
    init_logging();
    let (state, _) = started(with_page(), "op1", Instant::now());
    let (state, _) = update(state, Msg::Shutdown);
    let (_, effects) = update(state, Msg::Shutdown);

    assert_eq!(effects, vec![Effect::Shutdown]);
}

#[test]
fn out_of_order_poll_is_dropped() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = started(with_page(), "op1", t0);
    let newer = PollResult::new(
        UpdateEvent::status("Writing"),
        vec![UpdateEvent::status("Reading"), UpdateEvent::status("Writing")],
    );
    let older = PollResult::new(UpdateEvent::status("Reading"), vec![UpdateEvent::status("Reading")]);

    let (state, _) = polled(state, "op1", 2, t0, newer);
    let (state, _) = polled(state, "op1", 1, t0, older);

    let view = state.view();
    let answer = view.latest_answer().expect("answer row");
    assert_eq!(answer.live_status.as_deref(), Some("Writing"));
    assert_eq!(answer.history_len, 2);
}

#[test]
fn transport_failure_is_terminal_and_stops_polling() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = started(with_page(), "op1", t0);

    let (state, effects) = update(
        state,
        Msg::PollCompleted {
            operation_id: "op1".into(),
            seq: 1,
            at: t0,
            result: Err(FailureReason::Transport(
                "Polling failed with status 500".to_string(),
            )),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::StopPolling {
            operation_id: "op1".into()
        }]
    );
    let view = state.view();
    let answer = view.latest_answer().expect("answer row");
    assert_eq!(answer.failure.as_deref(), Some("Polling failed with status 500"));
    assert_eq!(answer.live_status.as_deref(), Some("Polling Error"));
    assert!(answer.is_terminal);
    assert!(!view.busy);
}

#[test]
fn start_failure_adds_error_row_and_allows_retry() {
    init_logging();
    let (state, _) = submit(with_page(), "q");
    let (state, effects) = update(
        state,
        Msg::OperationStartFailed {
            message: String::new(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.view().rows.last(),
        Some(&TranscriptRowView::StartFailed {
            message: "Could not start chat.".to_string()
        })
    );
    assert!(!state.view().busy);

    let (_, effects) = submit(state, "q again");
    assert_eq!(effects.len(), 1);
}

#[test]
fn reset_stops_tracking_and_clears_transcript() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = submit(with_page(), "q");
    let (state, _) = started(state, "op1", t0);

    let (state, effects) = update(state, Msg::ResetClicked);

    assert_eq!(
        effects,
        vec![Effect::StopPolling {
            operation_id: "op1".into()
        }]
    );
    let view = state.view();
    assert!(view.rows.is_empty());
    assert_eq!(view.tracking, None);
    assert!(state.controller().record(&"op1".into()).is_none());
    assert_eq!(view.page_id.as_deref(), Some("page-1"));
}

#[test]
fn status_history_disclosure_toggles_one_answer() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = started(with_page(), "op1", t0);
    let (state, _) = polled(
        state,
        "op1",
        1,
        t0 + Duration::from_millis(300),
        PollResult::new(
            UpdateEvent::status("Reading"),
            vec![UpdateEvent::status("Reading")],
        ),
    );

    let toggle = || Msg::StatusHistoryToggled {
        operation_id: "op1".into(),
    };
    let (state, _) = update(state, toggle());
    assert_eq!(
        state.view().latest_answer().and_then(|a| a.status_history.clone()),
        Some(vec!["Reading".to_string()])
    );

    let (state, _) = update(state, toggle());
    assert_eq!(
        state.view().latest_answer().and_then(|a| a.status_history.clone()),
        None
    );

    let (state, _) = update(
        state,
        Msg::StatusHistoryToggled {
            operation_id: "unknown".into(),
        },
    );
    assert_eq!(
        state.view().latest_answer().and_then(|a| a.status_history.clone()),
        None
    );
}
