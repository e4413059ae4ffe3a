//! Text commit boundary for a note's text input.
//!
//! Text reaches the store on every settled `input` event. Between
//! `compositionstart` and `compositionend` (IME input) nothing is committed;
//! `compositionend` and `blur` flush whatever the field holds.

#[cfg(test)]
#[path = "text_test.rs"]
mod text_test;

/// Events raised by a note's text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextEvent {
    CompositionStart,
    /// Composition finished; carries the field's full text.
    CompositionEnd(String),
    /// The field's full text after an input event.
    Input(String),
    /// Focus left the field; carries its full text.
    Blur(String),
}

/// Decides which text events commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextCommitGate {
    composing: bool,
}

impl TextCommitGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an IME composition is in progress.
    #[must_use]
    pub fn is_composing(&self) -> bool {
        self.composing
    }

    /// Feed one event; returns the text to commit, if any.
    pub fn handle(&mut self, event: TextEvent) -> Option<String> {
        match event {
            TextEvent::CompositionStart => {
                self.composing = true;
                None
            }
            TextEvent::CompositionEnd(text) | TextEvent::Blur(text) => {
                self.composing = false;
                Some(text)
            }
            TextEvent::Input(text) => (!self.composing).then_some(text),
        }
    }
}
