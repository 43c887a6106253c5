//! Incremental reveal of answer text, one character per render tick.
//!
//! The reveal pace is driven only by [`Typewriter::tick`], never by how often
//! the target text changes, so network cadence does not leak into rendering.

/// Reveals a target string gradually while it is streaming.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Typewriter {
    target: String,
    target_chars: usize,
    revealed: usize,
    ticking: bool,
}

impl Typewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the latest target text and streaming flag.
    pub fn set_target(&mut self, target: &str, streaming: bool) {
        if self.target != target {
            self.target = target.to_string();
            self.target_chars = target.chars().count();
        }

        if self.target.is_empty() {
            self.revealed = 0;
            self.ticking = false;
        } else if !streaming || self.revealed > self.target_chars {
            // Stream ended, or the replacement is shorter than what is shown.
            self.revealed = self.target_chars;
            self.ticking = false;
        } else {
            self.ticking = self.revealed < self.target_chars;
        }
    }

    /// Reveals one more character. Returns true if the display changed.
    pub fn tick(&mut self) -> bool {
        if !self.ticking {
            return false;
        }
        if self.revealed < self.target_chars {
            self.revealed += 1;
        }
        self.ticking = self.revealed < self.target_chars;
        true
    }

    pub fn displayed(&self) -> &str {
        let end = self
            .target
            .char_indices()
            .nth(self.revealed)
            .map_or(self.target.len(), |(offset, _)| offset);
        &self.target[..end]
    }

    /// True while there is text left to reveal.
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// Drops the current target so the next one reveals from zero.
    pub fn restart(&mut self) {
        *self = Self::default();
    }
}
