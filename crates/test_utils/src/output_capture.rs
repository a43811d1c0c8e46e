use rill_streams::{FileHandle, PtrMut, StreamRuntime, StreamSettings, make_ptr_mut};
use std::{collections::VecDeque, io};

/// Captures output written to a file handle in a String
///
/// [FileHandle] is implemented for OutputCapture, allowing it to be used as stdout and stderr
/// for the stream runtime. Input can be queued for reading, which allows an OutputCapture to
/// stand in for stdin too.
#[derive(Clone, Debug)]
pub struct OutputCapture {
    state: PtrMut<CaptureState>,
}

#[derive(Debug, Default)]
struct CaptureState {
    output: Vec<u8>,
    input: VecDeque<u8>,
    flush_count: usize,
    closed: bool,
}

impl Default for OutputCapture {
    fn default() -> Self {
        Self {
            state: make_ptr_mut!(CaptureState::default()),
        }
    }
}

impl OutputCapture {
    /// Returns a [StreamRuntime] with stdout and stderr captured by an instance of
    /// [OutputCapture], and with stdin reading from the provided input
    pub fn make_runtime_with_output_capture(input: &str) -> (StreamRuntime, Self) {
        let output_capture = Self::default();
        let stdin = Self::with_input(input);

        let runtime = StreamRuntime::with_settings(StreamSettings {
            stdin: Box::new(stdin),
            stdout: Box::new(output_capture.clone()),
            stderr: Box::new(output_capture.clone()),
            ..Default::default()
        });

        (runtime, output_capture)
    }

    /// Makes a capture with input queued for reading
    pub fn with_input(input: &str) -> Self {
        let result = Self::default();
        result.state.borrow_mut().input.extend(input.bytes());
        result
    }

    /// Clears the captured output
    pub fn clear(&self) {
        self.state.borrow_mut().output.clear();
    }

    /// Returns the currently captured output
    pub fn captured_output(&self) -> String {
        String::from_utf8_lossy(&self.state.borrow().output).into_owned()
    }

    /// The number of times the handle has been flushed
    pub fn flush_count(&self) -> usize {
        self.state.borrow().flush_count
    }

    /// Returns true if the handle has been closed
    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }
}

impl FileHandle for OutputCapture {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.state.borrow_mut().input.pop_front())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        if state.closed {
            return Err(io::Error::other("write after close"));
        }
        state.output.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.borrow_mut().flush_count += 1;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        state.flush_count += 1;
        state.closed = true;
        Ok(())
    }
}
