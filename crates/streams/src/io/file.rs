use crate::{DisplayContext, FileHandle, Result, error::map_io_err};
use rill_memory::{Ptr, PtrMut, RCell, WeakPtr};
use std::{fmt, fs, io, path::Path};
use tracing::{debug, warn};

/// A file object, either bound to an open host file or unbound
///
/// File objects are shared, clones refer to the same underlying state. The name and the host
/// handle are set and cleared together, a file is bound exactly when it has both.
///
/// When the last reference to a bound file is dropped, the file is closed unless it's one of
/// the standard stream aliases.
#[derive(Clone)]
pub struct File(PtrMut<FileState>);

#[derive(Default)]
pub(crate) struct FileState {
    binding: Option<Binding>,
    dont_close: bool,
    pushback: Option<char>,
    // A byte that ended an invalid multibyte sequence, returned by the next read
    pending_byte: Option<u8>,
    at_eof: bool,
}

struct Binding {
    name: Ptr<str>,
    handle: Box<dyn FileHandle>,
}

impl File {
    pub(crate) fn unbound() -> Self {
        Self(FileState::default().into())
    }

    pub(crate) fn standard(name: Ptr<str>, handle: Box<dyn FileHandle>) -> Self {
        let file = Self::unbound();
        {
            let mut state = file.0.borrow_mut();
            state.binding = Some(Binding { name, handle });
            state.dont_close = true;
        }
        file
    }

    pub(crate) fn downgrade(&self) -> WeakPtr<RCell<FileState>> {
        Ptr::downgrade(&self.0)
    }

    pub(crate) fn from_state(state: PtrMut<FileState>) -> Self {
        Self(state)
    }

    /// Binds the file to a newly opened handle, releasing any previous binding
    ///
    /// A rebound standard alias becomes an ordinary file that can be closed.
    pub(crate) fn bind(&self, name: Ptr<str>, handle: Box<dyn FileHandle>) {
        let mut state = self.0.borrow_mut();
        state.release();
        state.binding = Some(Binding { name, handle });
        state.dont_close = false;
        state.at_eof = false;
    }

    /// Returns true if the file is bound to an open host file
    pub fn is_bound(&self) -> bool {
        self.0.borrow().binding.is_some()
    }

    /// The name the file was opened with, if it's bound
    pub fn name(&self) -> Option<Ptr<str>> {
        self.0.borrow().binding.as_ref().map(|binding| binding.name.clone())
    }

    /// Returns true while the file is bound to one of the standard streams
    ///
    /// The host handles of the standard streams are never closed.
    pub fn is_standard(&self) -> bool {
        let state = self.0.borrow();
        state.dont_close && state.binding.is_some()
    }

    /// Returns true if a read has reached the end of the file
    ///
    /// The flag is cleared when a character is pushed back.
    pub fn at_eof(&self) -> bool {
        self.0.borrow().at_eof
    }

    /// Returns true if the two objects are the same file object
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Ptr::ptr_eq(&a.0, &b.0)
    }

    /// Closes the file, leaving it unbound
    ///
    /// Closing an unbound file has no effect. A standard stream alias is flushed and unbound,
    /// but its host handle stays open.
    pub fn close(&self) -> Result<()> {
        let mut state = self.0.borrow_mut();
        state.pushback = None;
        state.pending_byte = None;
        let Some(mut binding) = state.binding.take() else {
            return Ok(());
        };
        debug!(name = &*binding.name, "closing file");
        let result = if state.dont_close {
            binding.handle.flush()
        } else {
            binding.handle.close()
        };
        result.map_err(|error| map_io_err(error, &binding.name))
    }

    /// Flushes buffered output, a no-op for unbound files
    pub fn flush(&self) -> Result<()> {
        self.0.borrow_mut().flush()
    }

    pub(crate) fn read_char(&self) -> Result<Option<char>> {
        let mut state = self.0.borrow_mut();
        if let Some(c) = state.pushback.take() {
            return Ok(Some(c));
        }
        let FileState {
            binding,
            pending_byte,
            at_eof,
            ..
        } = &mut *state;
        let Some(binding) = binding else {
            return Ok(None);
        };
        let result = read_utf8_char(binding.handle.as_mut(), pending_byte)
            .map_err(|error| map_io_err(error, &binding.name))?;
        if result.is_none() {
            *at_eof = true;
        }
        Ok(result)
    }

    pub(crate) fn unread_char(&self, c: char) -> bool {
        let mut state = self.0.borrow_mut();
        if state.binding.is_none() || state.pushback.is_some() {
            return false;
        }
        state.pushback = Some(c);
        state.at_eof = false;
        true
    }

    /// Reads up to `limit` bytes of the next line, returning `None` when nothing was read
    pub(crate) fn read_line(&self, limit: usize) -> Result<Option<String>> {
        let mut state = self.0.borrow_mut();
        let mut line = Vec::new();
        if let Some(c) = state.pushback.take() {
            let mut buffer = [0; 4];
            line.extend_from_slice(c.encode_utf8(&mut buffer).as_bytes());
            if c == '\n' {
                return Ok(Some(c.into()));
            }
        }
        let FileState {
            binding,
            pending_byte,
            at_eof,
            ..
        } = &mut *state;
        if let Some(byte) = pending_byte.take() {
            line.push(byte);
            if byte == b'\n' {
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }
        }
        if let Some(binding) = binding {
            let remaining = limit.saturating_sub(line.len());
            if remaining > 0 {
                let read = binding
                    .handle
                    .read_line(remaining, &mut line)
                    .map_err(|error| map_io_err(error, &binding.name))?;
                if read == 0 {
                    *at_eof = true;
                }
            }
        }
        if line.is_empty() {
            Ok(None)
        } else {
            Ok(Some(String::from_utf8_lossy(&line).into_owned()))
        }
    }

    pub(crate) fn write_str(&self, text: &str) -> Result<usize> {
        let mut state = self.0.borrow_mut();
        match &mut state.binding {
            Some(binding) => {
                binding
                    .handle
                    .write_all(text.as_bytes())
                    .map_err(|error| map_io_err(error, &binding.name))?;
                Ok(text.chars().count())
            }
            None => Ok(0),
        }
    }

    pub(crate) fn display(&self, ctx: &mut DisplayContext) {
        ctx.append("#<file ");
        match self.name() {
            Some(name) => ctx.append(&*name),
            None => ctx.append("*unbound*"),
        }
        ctx.append_char('>');
    }
}

impl FileState {
    pub(crate) fn is_closable(&self) -> bool {
        self.binding.is_some() && !self.dont_close
    }

    fn flush(&mut self) -> Result<()> {
        match &mut self.binding {
            Some(binding) => binding
                .handle
                .flush()
                .map_err(|error| map_io_err(error, &binding.name)),
            None => Ok(()),
        }
    }

    /// Clears the binding, closing the host handle unless it belongs to a standard stream
    pub(crate) fn release(&mut self) {
        if let Some(mut binding) = self.binding.take() {
            let result = if self.dont_close {
                debug!(name = &*binding.name, "detaching standard file");
                binding.handle.flush()
            } else {
                debug!(name = &*binding.name, "releasing file");
                binding.handle.close()
            };
            if let Err(error) = result {
                warn!(name = &*binding.name, %error, "failed to release file");
            }
        }
        self.pushback = None;
        self.pending_byte = None;
    }
}

impl Drop for FileState {
    fn drop(&mut self) {
        self.release();
    }
}

impl PartialEq for File {
    /// Files are equal when they're the same object, or when both are bound to names that
    /// resolve to the same file on disk
    fn eq(&self, other: &Self) -> bool {
        if Self::ptr_eq(self, other) {
            return true;
        }
        match (self.name(), other.name()) {
            (Some(a), Some(b)) => same_file(&a, &b),
            _ => false,
        }
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ctx = DisplayContext::default();
        self.display(&mut ctx);
        f.write_str(&ctx.result())
    }
}

fn same_file(a: &str, b: &str) -> bool {
    match (fs::canonicalize(Path::new(a)), fs::canonicalize(Path::new(b))) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn read_utf8_char(
    handle: &mut dyn FileHandle,
    pending_byte: &mut Option<u8>,
) -> io::Result<Option<char>> {
    let first = match pending_byte.take() {
        Some(byte) => byte,
        None => match handle.read_byte()? {
            Some(byte) => byte,
            None => return Ok(None),
        },
    };
    let width = match first {
        0x00..=0x7f => return Ok(Some(first as char)),
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Ok(Some(char::REPLACEMENT_CHARACTER)),
    };
    let mut bytes = [first, 0, 0, 0];
    for byte in bytes.iter_mut().take(width).skip(1) {
        match handle.read_byte()? {
            Some(next @ 0x80..=0xbf) => *byte = next,
            Some(next) => {
                *pending_byte = Some(next);
                return Ok(Some(char::REPLACEMENT_CHARACTER));
            }
            None => return Ok(Some(char::REPLACEMENT_CHARACTER)),
        }
    }
    let c = std::str::from_utf8(&bytes[..width])
        .ok()
        .and_then(|s| s.chars().next())
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    Ok(Some(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BufferedFile;
    use std::io::Cursor;

    fn file_with_contents(contents: &str) -> File {
        let file = File::unbound();
        file.bind(
            "test".into(),
            Box::new(BufferedFile::new(Cursor::new(contents.as_bytes().to_vec()))),
        );
        file
    }

    #[test]
    fn multibyte_characters_are_decoded() {
        let file = file_with_contents("aé€");
        assert_eq!(file.read_char().unwrap(), Some('a'));
        assert_eq!(file.read_char().unwrap(), Some('é'));
        assert_eq!(file.read_char().unwrap(), Some('€'));
        assert!(!file.at_eof());
        assert_eq!(file.read_char().unwrap(), None);
        assert!(file.at_eof());
    }

    fn file_with_bytes(bytes: &[u8]) -> File {
        let file = File::unbound();
        file.bind(
            "bytes".into(),
            Box::new(BufferedFile::new(Cursor::new(bytes.to_vec()))),
        );
        file
    }

    #[test]
    fn truncated_sequences_keep_the_next_character() {
        let file = file_with_bytes(&[0xc3, b'a', b'b']);
        assert_eq!(file.read_char().unwrap(), Some(char::REPLACEMENT_CHARACTER));
        assert_eq!(file.read_char().unwrap(), Some('a'));
        assert_eq!(file.read_char().unwrap(), Some('b'));
        assert_eq!(file.read_char().unwrap(), None);

        let file = file_with_bytes(&[0xe2, 0x82, b'\n', b'x']);
        assert_eq!(file.read_char().unwrap(), Some(char::REPLACEMENT_CHARACTER));
        assert_eq!(file.read_line(10).unwrap().as_deref(), Some("\n"));
        assert_eq!(file.read_line(10).unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn a_single_character_can_be_pushed_back() {
        let file = file_with_contents("xy");
        assert_eq!(file.read_char().unwrap(), Some('x'));
        assert!(file.unread_char('x'));
        assert!(!file.unread_char('w'));
        assert_eq!(file.read_char().unwrap(), Some('x'));
        assert_eq!(file.read_char().unwrap(), Some('y'));
    }

    #[test]
    fn pushback_clears_the_eof_flag() {
        let file = file_with_contents("");
        assert_eq!(file.read_char().unwrap(), None);
        assert!(file.at_eof());
        assert!(file.unread_char('z'));
        assert!(!file.at_eof());
        assert_eq!(file.read_line(10).unwrap().as_deref(), Some("z"));
    }

    #[test]
    fn read_line_respects_the_limit() {
        let file = file_with_contents("abcdef\nghi");
        assert_eq!(file.read_line(4).unwrap().as_deref(), Some("abcd"));
        assert_eq!(file.read_line(40).unwrap().as_deref(), Some("ef\n"));
        assert_eq!(file.read_line(40).unwrap().as_deref(), Some("ghi"));
        assert_eq!(file.read_line(40).unwrap(), None);
    }

    #[test]
    fn closing_unbinds_the_file() {
        let file = file_with_contents("abc");
        assert!(file.is_bound());
        file.close().unwrap();
        assert!(!file.is_bound());
        assert_eq!(file.name(), None);
        assert_eq!(file.read_char().unwrap(), None);
        assert_eq!(file.write_str("abc").unwrap(), 0);
        file.close().unwrap();
    }

    #[test]
    fn unbound_files_print_their_state() {
        let file = File::unbound();
        assert_eq!(format!("{file:?}"), "#<file *unbound*>");
        assert_eq!(format!("{:?}", file_with_contents("")), "#<file test>");
    }
}
