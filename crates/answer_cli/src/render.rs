use std::collections::HashMap;
use std::io::{self, Write};

use answer_core::{AnswerRowView, AppViewModel, OperationId, TranscriptRowView};

#[derive(Debug, Default)]
struct AnswerProgress {
    printed: String,
    status: Option<String>,
    finished: bool,
    history_shown: bool,
}

/// Prints view model changes to a line-oriented terminal.
///
/// Only what changed since the previous render is written: new rows, status
/// changes and the newly revealed tail of each answer.
pub struct TerminalRenderer<W: Write> {
    out: W,
    rows_seen: usize,
    answers: HashMap<OperationId, AnswerProgress>,
    mid_line: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            rows_seen: 0,
            answers: HashMap::new(),
            mid_line: false,
        }
    }

    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        self.line(text)?;
        self.out.flush()
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        if view.rows.len() < self.rows_seen {
            self.line("-- transcript cleared --")?;
            self.rows_seen = 0;
            self.answers.clear();
        }

        for (index, row) in view.rows.iter().enumerate() {
            let is_new = index >= self.rows_seen;
            match row {
                TranscriptRowView::Query { text } if is_new => self.line(&format!("> {text}"))?,
                TranscriptRowView::StartFailed { message } if is_new => {
                    self.line(&format!("! {message}"))?
                }
                TranscriptRowView::Answer(answer) => self.render_answer(answer)?,
                _ => {}
            }
        }
        self.rows_seen = view.rows.len();
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_answer(&mut self, answer: &AnswerRowView) -> io::Result<()> {
        let mut progress = self
            .answers
            .remove(&answer.operation_id)
            .unwrap_or_default();

        if !progress.finished {
            if answer.live_status != progress.status {
                if let Some(status) = &answer.live_status {
                    self.line(&format!("  [{status}]"))?;
                }
                progress.status = answer.live_status.clone();
            }

            let text = answer.displayed_text.as_str();
            match text.strip_prefix(progress.printed.as_str()) {
                Some(tail) => self.write_text(tail)?,
                None => {
                    // Replaced by a different message; print it whole on a fresh line.
                    self.end_line()?;
                    self.write_text(text)?;
                }
            }
            progress.printed = text.to_string();

            if answer.is_terminal {
                if let Some(failure) = &answer.failure {
                    self.line(&format!("  x {failure}"))?;
                }
                self.line(&format!(
                    "  ({} status updates, /history to show)",
                    answer.history_len
                ))?;
                progress.finished = true;
            }
        }

        match &answer.status_history {
            Some(history) if !progress.history_shown => {
                self.line("  status history:")?;
                for status in history {
                    self.line(&format!("    - {status}"))?;
                }
                progress.history_shown = true;
            }
            Some(_) => {}
            None => progress.history_shown = false,
        }

        self.answers.insert(answer.operation_id.clone(), progress);
        Ok(())
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        self.end_line()?;
        writeln!(self.out, "{text}")
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        write!(self.out, "{text}")?;
        self.mid_line = !text.ends_with('\n');
        Ok(())
    }

    fn end_line(&mut self) -> io::Result<()> {
        if self.mid_line {
            writeln!(self.out)?;
            self.mid_line = false;
        }
        Ok(())
    }
}
