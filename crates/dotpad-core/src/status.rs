use std::time::{Duration, Instant};

/// Transient status text with an optional auto-clear deadline.
///
/// Each [`StatusLine::show`] replaces both the text and any pending clear, so a message can never
/// be wiped by the timer of the message before it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    text: String,
    clear_at: Option<Instant>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, text: impl Into<String>, hide_after: Option<Duration>, now: Instant) {
        self.text = text.into();
        self.clear_at = hide_after.map(|d| now + d);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.clear_at
    }

    /// Clears the text once its deadline has passed. Returns `true` if it cleared.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.clear_at {
            Some(at) if at <= now => {
                self.text.clear();
                self.clear_at = None;
                true
            }
            _ => false,
        }
    }
}
