use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use answer_core::{update, AppState, AppViewModel, Msg};
use answer_logging::{answer_info, answer_warn};

use crate::config::ResolvedConfig;
use crate::effects::EffectRunner;
use crate::render::TerminalRenderer;

/// Everything the message loop reacts to.
#[derive(Debug)]
pub enum Input {
    Msg(Msg),
    /// A line typed by the user; interpreted against the current view.
    Line(String),
}

impl From<Msg> for Input {
    fn from(msg: Msg) -> Self {
        Input::Msg(msg)
    }
}

pub fn run_app(config: ResolvedConfig) -> anyhow::Result<()> {
    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let mut runner =
        EffectRunner::new(&config.client, input_tx.clone()).context("starting engine")?;
    let mut state = AppState::with_settings(config.tracker);
    let mut renderer = TerminalRenderer::new(io::stdout());

    match config.page_id {
        Some(page_id) => {
            renderer.notice(&format!("Asking about page {page_id}. /help lists commands."))?;
            let _ = input_tx.send(Input::Msg(Msg::PageSelected(page_id)));
        }
        None => renderer.notice("No page selected. Use /page <id> before asking.")?,
    }

    spawn_stdin_reader(input_tx.clone());
    spawn_render_ticker(input_tx, config.tracker.type_speed);

    while let Ok(input) = input_rx.recv() {
        let msgs = match input {
            Input::Msg(msg) => vec![msg],
            Input::Line(line) if line.trim() == "/help" => {
                renderer.notice(HELP)?;
                Vec::new()
            }
            Input::Line(line) => interpret_line(&line, &state.view()),
        };
        for msg in msgs {
            let (next, effects) = update(state, msg);
            state = next;
            let keep_running = runner.run(effects);
            if state.consume_dirty() {
                renderer.render(&state.view())?;
            }
            if !keep_running {
                answer_info!("session ended");
                return Ok(());
            }
        }
    }
    Ok(())
}

const HELP: &str = "Commands: /page <id>, /history, /reset, /quit. Any other line is a question.";

/// Turns one input line into core messages.
pub(crate) fn interpret_line(line: &str, view: &AppViewModel) -> Vec<Msg> {
    let trimmed = line.trim();
    let (command, argument) = trimmed
        .split_once(char::is_whitespace)
        .map_or((trimmed, ""), |(command, rest)| (command, rest.trim()));

    match command {
        "" => Vec::new(),
        "/quit" => vec![Msg::Shutdown],
        "/reset" => vec![Msg::ResetClicked],
        "/history" => view
            .latest_answer()
            .map(|answer| Msg::StatusHistoryToggled {
                operation_id: answer.operation_id.clone(),
            })
            .into_iter()
            .collect(),
        "/page" if argument.is_empty() => {
            answer_warn!("/page needs an id");
            Vec::new()
        }
        "/page" => vec![Msg::PageSelected(argument.to_string())],
        _ => vec![Msg::InputChanged(trimmed.to_string()), Msg::QuerySubmitted],
    }
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(Input::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Input::Msg(Msg::Shutdown));
    });
}

fn spawn_render_ticker(input_tx: mpsc::Sender<Input>, interval: Duration) {
    thread::spawn(move || {
        while input_tx.send(Input::Msg(Msg::RenderTick)).is_ok() {
            thread::sleep(interval);
        }
    });
}

#[cfg(test)]
mod tests {
    use answer_core::{AnswerRowView, OperationId, TranscriptRowView};

    use super::*;

    fn view_with_answer(id: &str) -> AppViewModel {
        AppViewModel {
            rows: vec![TranscriptRowView::Answer(AnswerRowView {
                operation_id: OperationId::from(id),
                displayed_text: String::new(),
                live_status: None,
                history_len: 0,
                status_history: None,
                is_active: false,
                is_terminal: true,
                failure: None,
            })],
            ..AppViewModel::default()
        }
    }

    #[test]
    fn plain_line_submits_a_query() {
        assert_eq!(
            interpret_line("  what is new?  ", &AppViewModel::default()),
            vec![
                Msg::InputChanged("what is new?".to_string()),
                Msg::QuerySubmitted
            ]
        );
    }

    #[test]
    fn commands_map_to_messages() {
        let view = AppViewModel::default();
        assert_eq!(interpret_line("/quit", &view), vec![Msg::Shutdown]);
        assert_eq!(interpret_line("/reset", &view), vec![Msg::ResetClicked]);
        assert_eq!(
            interpret_line("/page docs-12", &view),
            vec![Msg::PageSelected("docs-12".to_string())]
        );
        assert!(interpret_line("/page", &view).is_empty());
        assert!(interpret_line("   ", &view).is_empty());
    }

    #[test]
    fn history_toggles_the_latest_answer() {
        assert_eq!(
            interpret_line("/history", &view_with_answer("op3")),
            vec![Msg::StatusHistoryToggled {
                operation_id: OperationId::from("op3")
            }]
        );
        assert!(interpret_line("/history", &AppViewModel::default()).is_empty());
    }
}
