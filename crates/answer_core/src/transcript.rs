use crate::OperationId;

/// Label shown on a fresh answer before the first poll lands.
pub const INITIAL_STATUS: &str = "Initializing...";

/// The durable record of one tracked operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub id: OperationId,
    pub text: String,
    pub live_status: Option<String>,
    pub status_history: Vec<String>,
    pub is_active: bool,
    pub is_terminal: bool,
    pub failure: Option<String>,
}

impl TranscriptEntry {
    pub fn new(id: OperationId) -> Self {
        Self {
            id,
            text: String::new(),
            live_status: Some(INITIAL_STATUS.to_string()),
            status_history: Vec::new(),
            is_active: true,
            is_terminal: false,
            failure: None,
        }
    }

    /// Appends a label unless it repeats the most recent one.
    pub(crate) fn push_status(&mut self, label: String) {
        if self.status_history.last() != Some(&label) {
            self.status_history.push(label);
        }
    }

    pub(crate) fn freeze(&mut self) {
        self.is_active = false;
        self.is_terminal = true;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptItem {
    Query { text: String },
    Answer(TranscriptEntry),
    StartFailed { message: String },
}

/// Ordered conversation of queries and the answers tracked for them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    items: Vec<TranscriptItem>,
}

impl Transcript {
    pub fn items(&self) -> &[TranscriptItem] {
        &self.items
    }

    pub fn answer(&self, id: &OperationId) -> Option<&TranscriptEntry> {
        self.items.iter().rev().find_map(|item| match item {
            TranscriptItem::Answer(entry) if &entry.id == id => Some(entry),
            _ => None,
        })
    }

    pub(crate) fn answer_mut(&mut self, id: &OperationId) -> Option<&mut TranscriptEntry> {
        self.items.iter_mut().rev().find_map(|item| match item {
            TranscriptItem::Answer(entry) if &entry.id == id => Some(entry),
            _ => None,
        })
    }

    pub(crate) fn push(&mut self, item: TranscriptItem) {
        self.items.push(item);
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}
