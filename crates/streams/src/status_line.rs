use crate::{RillSend, RillSync};

/// The editor's status line, usable as an output stream
pub trait StatusLine: RillSend + RillSync {
    /// Returns true if a message is currently being displayed
    fn message_pending(&self) -> bool;

    /// Starts a new message, replacing any existing one
    fn start_message(&mut self, text: &str);

    /// Appends text to the pending message
    fn append_message(&mut self, text: &str);

    /// Asks for the status line to be redrawn
    fn request_redraw(&mut self);
}

/// A [StatusLine] that keeps its message in memory
///
/// Used by default when no editor is attached.
#[derive(Clone, Debug, Default)]
pub struct StatusMessage {
    message: String,
    pending: bool,
    redraw_requested: bool,
}

impl StatusMessage {
    /// The current message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Removes the pending message, returning it if there was one
    pub fn clear(&mut self) -> Option<String> {
        if self.pending {
            self.pending = false;
            self.redraw_requested = true;
            Some(std::mem::take(&mut self.message))
        } else {
            None
        }
    }

    /// Returns true if a redraw was requested since the last call
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }
}

impl StatusLine for StatusMessage {
    fn message_pending(&self) -> bool {
        self.pending
    }

    fn start_message(&mut self, text: &str) {
        self.message.clear();
        self.message.push_str(text);
        self.pending = true;
        self.redraw_requested = true;
    }

    fn append_message(&mut self, text: &str) {
        self.message.push_str(text);
    }

    fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_started_then_extended() {
        let mut status = StatusMessage::default();
        assert!(!status.message_pending());

        status.start_message("abc");
        assert!(status.take_redraw_request());
        status.append_message("def");
        assert!(!status.take_redraw_request());
        assert_eq!(status.message(), "abcdef");

        assert_eq!(status.clear().as_deref(), Some("abcdef"));
        assert!(!status.message_pending());
        assert_eq!(status.clear(), None);
    }
}
