//! Sequential dialog
//!
//! Shows one message at a time. While active, the game loop routes every
//! interaction to [`DialogSystem::advance`] and drops movement.

use std::fmt;

/// Fired once when the last message is dismissed
pub type OnComplete = Box<dyn FnOnce()>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialogError {
    #[error("dialog needs at least one message")]
    Empty,
}

/// Result of dismissing the current message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogStep {
    /// Nothing was showing
    Inactive,
    /// The message at this index is now displayed
    Next(usize),
    /// The dialog ended and was hidden
    Closed,
}

/// The message currently on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogLine<'a> {
    pub speaker: &'a str,
    pub message: &'a str,
    pub index: usize,
    pub total: usize,
}

#[derive(Default)]
pub struct DialogSystem {
    active: bool,
    speaker: String,
    messages: Vec<String>,
    index: usize,
    on_complete: Option<OnComplete>,
}

impl fmt::Debug for DialogSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogSystem")
            .field("active", &self.active)
            .field("speaker", &self.speaker)
            .field("messages", &self.messages)
            .field("index", &self.index)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl DialogSystem {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Open a dialog at its first message. Replaces any dialog in progress
    /// without firing its callback.
    pub fn show(
        &mut self,
        speaker: &str,
        messages: &[String],
        on_complete: Option<OnComplete>,
    ) -> Result<(), DialogError> {
        if messages.is_empty() {
            return Err(DialogError::Empty);
        }
        self.active = true;
        self.speaker = speaker.to_string();
        self.messages = messages.to_vec();
        self.index = 0;
        self.on_complete = on_complete;
        Ok(())
    }

    /// Dismiss the current message
    pub fn advance(&mut self) -> DialogStep {
        if !self.active {
            return DialogStep::Inactive;
        }
        self.index += 1;
        if self.index >= self.messages.len() {
            self.active = false;
            self.messages.clear();
            self.index = 0;
            if let Some(callback) = self.on_complete.take() {
                callback();
            }
            return DialogStep::Closed;
        }
        DialogStep::Next(self.index)
    }

    /// What the dialog box should display, if anything
    pub fn current(&self) -> Option<DialogLine<'_>> {
        if !self.active {
            return None;
        }
        let message = self.messages.get(self.index)?;
        Some(DialogLine {
            speaker: &self.speaker,
            message,
            index: self.index,
            total: self.messages.len(),
        })
    }
}
