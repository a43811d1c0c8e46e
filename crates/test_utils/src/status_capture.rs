use rill_streams::{PtrMut, StatusLine, make_ptr_mut};

/// A [StatusLine] that records every message and redraw request
#[derive(Clone, Debug)]
pub struct StatusCapture {
    state: PtrMut<StatusState>,
}

#[derive(Debug, Default)]
struct StatusState {
    messages: Vec<String>,
    pending: bool,
    redraws: usize,
}

impl Default for StatusCapture {
    fn default() -> Self {
        Self {
            state: make_ptr_mut!(StatusState::default()),
        }
    }
}

impl StatusCapture {
    /// Returns a shared status line that reports to this capture
    pub fn status_line(&self) -> PtrMut<dyn StatusLine> {
        make_ptr_mut!(self.clone())
    }

    /// Every message that was started, including any text appended to it
    pub fn messages(&self) -> Vec<String> {
        self.state.borrow().messages.clone()
    }

    /// The number of redraws that have been requested
    pub fn redraw_count(&self) -> usize {
        self.state.borrow().redraws
    }

    /// Dismisses the current message, so that the next write starts a new one
    pub fn dismiss(&self) {
        self.state.borrow_mut().pending = false;
    }
}

impl StatusLine for StatusCapture {
    fn message_pending(&self) -> bool {
        self.state.borrow().pending
    }

    fn start_message(&mut self, text: &str) {
        let mut state = self.state.borrow_mut();
        state.messages.push(text.into());
        state.pending = true;
        state.redraws += 1;
    }

    fn append_message(&mut self, text: &str) {
        if let Some(message) = self.state.borrow_mut().messages.last_mut() {
            message.push_str(text);
        }
    }

    fn request_redraw(&mut self) {
        self.state.borrow_mut().redraws += 1;
    }
}
