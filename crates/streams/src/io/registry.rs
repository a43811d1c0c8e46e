use crate::{
    BufferedFile, File, FileHandle, Result, Value,
    error::{argument_error, map_io_err},
    io::file::FileState,
};
use rill_memory::{Ptr, RCell, WeakPtr, lazy};
use std::{fs::OpenOptions, mem};
use tracing::debug;

/// The result of a registry sweep
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// The number of file objects that were found to be unreachable
    pub released: usize,
    /// The number of file objects that are still alive
    pub retained: usize,
}

/// Tracks every file object created by the runtime
///
/// The registry doesn't keep files alive, apart from the three standard stream aliases which
/// are created on first access and then live as long as the registry. Unreachable files are
/// closed when their last reference is dropped, [FileRegistry::sweep] prunes their entries.
pub struct FileRegistry {
    files: Vec<WeakPtr<RCell<FileState>>>,
    stdin: StandardFile,
    stdout: StandardFile,
    stderr: StandardFile,
}

enum StandardFile {
    Pending(Box<dyn FileHandle>),
    Created(File),
    Taken,
}

impl FileRegistry {
    /// Makes a registry that uses the given handles for the standard stream aliases
    pub fn new(
        stdin: Box<dyn FileHandle>,
        stdout: Box<dyn FileHandle>,
        stderr: Box<dyn FileHandle>,
    ) -> Self {
        Self {
            files: Vec::new(),
            stdin: StandardFile::Pending(stdin),
            stdout: StandardFile::Pending(stdout),
            stderr: StandardFile::Pending(stderr),
        }
    }

    /// Makes a new unbound file object
    pub fn make_file(&mut self) -> File {
        let file = File::unbound();
        self.files.push(file.downgrade());
        file
    }

    /// Opens a host file with a C-style mode string (`r`, `w`, `a`, `r+`, `w+`, `a+`, with an
    /// optional `b`)
    ///
    /// If `existing` is provided then its current binding is released and it's rebound to the
    /// new host file, otherwise a new file object is made. A standard stream alias can be
    /// rebound too, its host handle is flushed but left open. If the host file can't be
    /// opened then a `FileError` is returned and the file object is left unbound.
    pub fn open(&mut self, name: &str, mode: &str, existing: Option<&File>) -> Result<File> {
        let Some(options) = open_options(mode) else {
            return argument_error(&Value::from(mode), 2);
        };

        let file = match existing {
            Some(file) => {
                file.close()?;
                file.clone()
            }
            None => self.make_file(),
        };

        match options.open(name) {
            Ok(handle) => {
                debug!(name, mode, "opened file");
                file.bind(Ptr::from(name), Box::new(BufferedFile::new(handle)));
                Ok(file)
            }
            Err(error) => {
                debug!(name, mode, %error, "failed to open file");
                Err(map_io_err(error, name))
            }
        }
    }

    /// The file object bound to the process's stdin
    pub fn stdin(&mut self) -> File {
        let file = Self::standard(&mut self.stdin, lazy!(Ptr<str>; "<stdin>"));
        self.track(&file);
        file
    }

    /// The file object bound to the process's stdout
    pub fn stdout(&mut self) -> File {
        let file = Self::standard(&mut self.stdout, lazy!(Ptr<str>; "<stdout>"));
        self.track(&file);
        file
    }

    /// The file object bound to the process's stderr
    pub fn stderr(&mut self) -> File {
        let file = Self::standard(&mut self.stderr, lazy!(Ptr<str>; "<stderr>"));
        self.track(&file);
        file
    }

    /// Prunes the entries of file objects that are no longer reachable
    pub fn sweep(&mut self) -> SweepStats {
        let before = self.files.len();
        self.files.retain(|file| !file.is_dangling());
        let stats = SweepStats {
            released: before - self.files.len(),
            retained: self.files.len(),
        };
        debug!(released = stats.released, retained = stats.retained, "swept files");
        stats
    }

    /// The number of live file objects
    pub fn len(&self) -> usize {
        self.files.iter().filter(|file| !file.is_dangling()).count()
    }

    /// Returns true if there are no live file objects
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Closes every bound file that isn't one of the standard stream aliases
    ///
    /// Called when the registry is dropped. Errors while closing are logged and ignored.
    pub fn shutdown(&mut self) {
        let mut closed = 0;
        for file in mem::take(&mut self.files) {
            if let Some(state) = file.upgrade() {
                let mut state = state.borrow_mut();
                if state.is_closable() {
                    state.release();
                    closed += 1;
                }
            }
        }
        debug!(closed, "file registry shut down");
    }

    fn standard(slot: &mut StandardFile, name: Ptr<str>) -> File {
        match mem::replace(slot, StandardFile::Taken) {
            StandardFile::Pending(handle) => {
                let file = File::standard(name, handle);
                *slot = StandardFile::Created(file.clone());
                file
            }
            StandardFile::Created(file) => {
                *slot = StandardFile::Created(file.clone());
                file
            }
            StandardFile::Taken => File::unbound(),
        }
    }

    fn track(&mut self, file: &File) {
        let tracked = self.files.iter().any(|entry| {
            entry
                .upgrade()
                .is_some_and(|state| File::ptr_eq(&File::from_state(state), file))
        });
        if !tracked {
            self.files.push(file.downgrade());
        }
    }
}

impl Drop for FileRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn open_options(mode: &str) -> Option<OpenOptions> {
    let mode: String = mode.chars().filter(|c| *c != 'b').collect();
    let mut options = OpenOptions::new();
    match mode.as_str() {
        "r" => options.read(true),
        "w" => options.write(true).create(true).truncate(true),
        "a" => options.append(true).create(true),
        "r+" => options.read(true).write(true),
        "w+" => options.read(true).write(true).create(true).truncate(true),
        "a+" => options.read(true).append(true).create(true),
        _ => return None,
    };
    Some(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn registry() -> FileRegistry {
        FileRegistry::new(
            Box::new(io::empty()),
            Box::new(io::empty()),
            Box::new(io::empty()),
        )
    }

    #[test]
    fn standard_aliases_are_created_once() {
        let mut files = registry();
        let a = files.stdout();
        let b = files.stdout();
        assert!(File::ptr_eq(&a, &b));
        assert!(a.is_standard());
        assert_eq!(a.name().as_deref(), Some("<stdout>"));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn standard_aliases_survive_a_sweep() {
        let mut files = registry();
        drop(files.stdin());
        let stats = files.sweep();
        assert_eq!(stats, SweepStats { released: 0, retained: 1 });
    }

    #[test]
    fn dropped_files_are_pruned() {
        let mut files = registry();
        let kept = files.make_file();
        drop(files.make_file());
        let stats = files.sweep();
        assert_eq!(stats, SweepStats { released: 1, retained: 1 });
        assert!(!kept.is_bound());
    }

    #[test]
    fn invalid_modes_are_rejected() {
        let mut files = registry();
        assert!(files.open("anything", "rw", None).is_err());
        assert!(open_options("rb").is_some());
        assert!(open_options("a+b").is_some());
        assert!(open_options("").is_none());
    }
}
