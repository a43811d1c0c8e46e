use rill_streams::{Process, ProcessRef, PtrMut, Result, make_ptr_mut};

/// A [Process] that captures everything written to its standard input
#[derive(Clone, Debug)]
pub struct ProcessCapture {
    name: String,
    state: PtrMut<ProcessState>,
}

#[derive(Debug)]
struct ProcessState {
    stdin: Vec<u8>,
    running: bool,
}

impl ProcessCapture {
    /// Makes a running process with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            state: make_ptr_mut!(ProcessState {
                stdin: Vec::new(),
                running: true,
            }),
        }
    }

    /// Returns a shared process reference that reports to this capture
    pub fn process(&self) -> ProcessRef {
        make_ptr_mut!(self.clone())
    }

    /// Marks the process as exited
    pub fn exit(&self) {
        self.state.borrow_mut().running = false;
    }

    /// The text written to the process's standard input
    pub fn captured_input(&self) -> String {
        String::from_utf8_lossy(&self.state.borrow().stdin).into_owned()
    }
}

impl Process for ProcessCapture {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_running(&mut self) -> bool {
        self.state.borrow().running
    }

    fn write_stdin(&mut self, bytes: &[u8]) -> Result<usize> {
        self.state.borrow_mut().stdin.extend_from_slice(bytes);
        Ok(bytes.len())
    }
}
