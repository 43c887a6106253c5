use crate::OperationId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub page_id: Option<String>,
    pub input: String,
    /// A start request is pending or an operation is being tracked.
    pub busy: bool,
    pub tracking: Option<OperationId>,
    pub rows: Vec<TranscriptRowView>,
    /// The typewriter still has text to reveal.
    pub reveal_pending: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptRowView {
    Query { text: String },
    Answer(AnswerRowView),
    StartFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRowView {
    pub operation_id: OperationId,
    pub displayed_text: String,
    pub live_status: Option<String>,
    pub history_len: usize,
    /// Full status history, present only while the disclosure is open.
    pub status_history: Option<Vec<String>>,
    pub is_active: bool,
    pub is_terminal: bool,
    pub failure: Option<String>,
}

impl AppViewModel {
    /// The most recent answer row, if any.
    pub fn latest_answer(&self) -> Option<&AnswerRowView> {
        self.rows.iter().rev().find_map(|row| match row {
            TranscriptRowView::Answer(answer) => Some(answer),
            _ => None,
        })
    }

    pub fn answer(&self, operation_id: &OperationId) -> Option<&AnswerRowView> {
        self.rows.iter().find_map(|row| match row {
            TranscriptRowView::Answer(answer) if &answer.operation_id == operation_id => {
                Some(answer)
            }
            _ => None,
        })
    }
}
