use crate::controller::RequestLifecycleController;
use crate::transcript::{Transcript, TranscriptItem};
use crate::typewriter::Typewriter;
use crate::view_model::{AnswerRowView, AppViewModel, TranscriptRowView};
use crate::{OperationId, TrackerSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub(crate) settings: TrackerSettings,
    pub(crate) page_id: Option<String>,
    pub(crate) input: String,
    pub(crate) start_pending: bool,
    pub(crate) controller: RequestLifecycleController,
    pub(crate) transcript: Transcript,
    pub(crate) typewriter: Typewriter,
    /// Answer currently followed by the typewriter.
    pub(crate) revealing: Option<OperationId>,
    pub(crate) expanded_history: Option<OperationId>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(TrackerSettings::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: TrackerSettings) -> Self {
        Self {
            settings,
            page_id: None,
            input: String::new(),
            start_pending: false,
            controller: RequestLifecycleController::new(settings.stale_timeout),
            transcript: Transcript::default(),
            typewriter: Typewriter::new(),
            revealing: None,
            expanded_history: None,
            dirty: false,
        }
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn controller(&self) -> &RequestLifecycleController {
        &self.controller
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn view(&self) -> AppViewModel {
        let rows = self
            .transcript
            .items()
            .iter()
            .map(|item| match item {
                TranscriptItem::Query { text } => TranscriptRowView::Query { text: text.clone() },
                TranscriptItem::StartFailed { message } => TranscriptRowView::StartFailed {
                    message: message.clone(),
                },
                TranscriptItem::Answer(entry) => {
                    let displayed_text = if self.revealing.as_ref() == Some(&entry.id) {
                        self.typewriter.displayed().to_string()
                    } else {
                        entry.text.clone()
                    };
                    let expanded = self.expanded_history.as_ref() == Some(&entry.id);
                    TranscriptRowView::Answer(AnswerRowView {
                        operation_id: entry.id.clone(),
                        displayed_text,
                        live_status: entry.live_status.clone(),
                        history_len: entry.status_history.len(),
                        status_history: expanded.then(|| entry.status_history.clone()),
                        is_active: entry.is_active,
                        is_terminal: entry.is_terminal,
                        failure: entry.failure.clone(),
                    })
                }
            })
            .collect();

        AppViewModel {
            page_id: self.page_id.clone(),
            input: self.input.clone(),
            busy: self.start_pending || self.controller.current().is_some(),
            tracking: self.controller.current().cloned(),
            rows,
            reveal_pending: self.typewriter.is_ticking(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Points the typewriter at the latest text of the answer it follows.
    pub(crate) fn sync_reveal(&mut self) {
        let Some(id) = self.revealing.as_ref() else {
            return;
        };
        if let Some(entry) = self.transcript.answer(id) {
            self.typewriter.set_target(&entry.text, entry.is_active);
        }
    }
}
