use crate::{Result, RillSend, RillSync, error::map_io_err};
use rill_memory::PtrMut;
use std::{
    io::Write,
    process::{Child, Command, Stdio},
};

/// A subprocess that can be used as an output stream
///
/// Writing to a process stream sends the text to the process's standard input.
pub trait Process: RillSend + RillSync {
    /// The process's name
    fn name(&self) -> String;

    /// Returns true if the process is still running
    fn is_running(&mut self) -> bool;

    /// Writes bytes to the process's standard input, returning the number of bytes written
    fn write_stdin(&mut self, bytes: &[u8]) -> Result<usize>;
}

/// A shared reference to a [Process]
pub type ProcessRef = PtrMut<dyn Process>;

/// A [Process] backed by a spawned child process
pub struct ChildProcess {
    name: String,
    child: Child,
}

impl ChildProcess {
    /// Spawns the command with a piped standard input
    pub fn spawn(name: &str, command: &mut Command) -> Result<Self> {
        let child = command
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|error| map_io_err(error, name))?;
        Ok(Self {
            name: name.into(),
            child,
        })
    }

    /// Closes the process's standard input and waits for it to exit
    pub fn finish(mut self) -> Result<i32> {
        drop(self.child.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|error| map_io_err(error, &self.name))?;
        Ok(status.code().unwrap_or(-1))
    }
}

impl Process for ChildProcess {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn write_stdin(&mut self, bytes: &[u8]) -> Result<usize> {
        match &mut self.child.stdin {
            Some(stdin) => {
                stdin
                    .write_all(bytes)
                    .and_then(|_| stdin.flush())
                    .map_err(|error| map_io_err(error, &self.name))?;
                Ok(bytes.len())
            }
            None => Ok(0),
        }
    }
}
