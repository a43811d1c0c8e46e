use crate::{
    BufferRef, Callable, File, MarkRef, Position, ProcessRef, Result, StringSink, Value,
    error::{argument_error, invalid_stream},
};
use rill_memory::{Ptr, PtrMut};
use std::fmt;

/// A character source and/or sink
///
/// Streams are a closed set of kinds, every stream operation dispatches on the kind.
/// Most kinds wrap a shared reference, so clones of a stream share their read and write
/// positions.
#[derive(Clone)]
pub enum Stream {
    /// A file object, readable and writable
    File(File),
    /// A resident mark, reading and writing advances the mark
    Mark(MarkRef),
    /// A buffer, reading and writing advances the buffer's point
    Buffer(BufferRef),
    /// Reads characters from a string
    StringInput(PtrMut<StringInput>),
    /// Accumulates written text in a [StringSink]
    StringOutput(PtrMut<StringSink>),
    /// A private position in a buffer, independent of the buffer's point
    BufferPosition(BufferPosition),
    /// Writes at the end of a buffer's restriction
    BufferAppend(BufferRef),
    /// A host function that's called for each operation
    Callable(Callable),
    /// Writes to a process's standard input
    Process(ProcessRef),
    /// Writes to the editor's status line
    StatusLine,
    /// Resolves to the runtime's current standard input or standard output binding
    Default,
}

/// The state of a string-input stream
#[derive(Clone, Debug)]
pub struct StringInput {
    text: Ptr<str>,
    // A byte offset into `text`, always on a char boundary
    offset: usize,
}

impl StringInput {
    fn new(text: Ptr<str>, start: usize) -> Self {
        let offset = text
            .char_indices()
            .nth(start)
            .map_or(text.len(), |(offset, _)| offset);
        Self { text, offset }
    }

    pub(crate) fn read_char(&mut self) -> Option<char> {
        let c = self.text[self.offset..].chars().next()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    pub(crate) fn unread_char(&mut self) -> bool {
        match self.text[..self.offset].chars().next_back() {
            Some(c) => {
                self.offset -= c.len_utf8();
                true
            }
            None => false,
        }
    }

    /// The text that hasn't been read yet
    pub fn remaining(&self) -> &str {
        &self.text[self.offset..]
    }
}

/// A buffer paired with a stream-private position
#[derive(Clone)]
pub struct BufferPosition {
    /// The buffer being read or written
    pub buffer: BufferRef,
    /// The stream's position, advanced by each operation
    pub position: PtrMut<Position>,
}

impl Stream {
    /// Coerces a value into a stream
    ///
    /// - `Nil` is the default stream.
    /// - `True` is the status line.
    /// - Files, marks, buffers, processes, and functions are streams of their own kind.
    /// - Stream values are returned as-is.
    ///
    /// Any other value results in an `InvalidStream` error.
    pub fn from_value(value: &Value) -> Result<Self> {
        let result = match value {
            Value::Nil => Self::Default,
            Value::True => Self::StatusLine,
            Value::File(file) => Self::File(file.clone()),
            Value::Mark(mark) => Self::Mark(mark.clone()),
            Value::Buffer(buffer) => Self::Buffer(buffer.clone()),
            Value::Process(process) => Self::Process(process.clone()),
            Value::Function(function) => Self::Callable(function.clone()),
            Value::Stream(stream) => stream.clone(),
            Value::Int(_) | Value::Str(_) => return invalid_stream(value.clone(), None),
        };
        Ok(result)
    }

    /// Makes a stream that reads from a string, starting at the given character index
    pub fn string_input(text: impl Into<Ptr<str>>, start: usize) -> Self {
        Self::StringInput(StringInput::new(text.into(), start).into())
    }

    /// Makes a stream that accumulates everything written to it
    pub fn string_output() -> Self {
        Self::StringOutput(StringSink::default().into())
    }

    /// Makes a stream with its own position in a buffer
    pub fn buffer_position(buffer: BufferRef, position: Position) -> Self {
        Self::BufferPosition(BufferPosition {
            buffer,
            position: position.into(),
        })
    }

    /// Makes a stream that appends to the end of a buffer's restriction
    pub fn buffer_append(buffer: BufferRef) -> Self {
        Self::BufferAppend(buffer)
    }

    /// Returns the text accumulated by a string-output stream and resets the stream
    ///
    /// An `ArgumentError` is returned for any other kind of stream.
    pub fn take_output(&self) -> Result<Ptr<str>> {
        match self {
            Self::StringOutput(sink) => Ok(sink.borrow_mut().extract()),
            _ => argument_error(&self.clone().into(), 1),
        }
    }

    /// A name for the stream's kind, used when displaying streams without a value form
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Mark(_) => "mark",
            Self::Buffer(_) => "buffer",
            Self::StringInput(_) => "string-input",
            Self::StringOutput(_) => "string-output",
            Self::BufferPosition(_) => "buffer-position",
            Self::BufferAppend(_) => "buffer-append",
            Self::Callable(_) => "function",
            Self::Process(_) => "process",
            Self::StatusLine => "status-line",
            Self::Default => "default",
        }
    }
}

/// Returns true if the value can be used as a stream
pub fn is_stream(value: &Value) -> bool {
    Stream::from_value(value).is_ok()
}

impl From<Stream> for Value {
    fn from(stream: Stream) -> Self {
        match stream {
            Stream::Default => Value::Nil,
            Stream::StatusLine => Value::True,
            Stream::File(file) => Value::File(file),
            Stream::Mark(mark) => Value::Mark(mark),
            Stream::Buffer(buffer) => Value::Buffer(buffer),
            Stream::Process(process) => Value::Process(process),
            Stream::Callable(function) => Value::Function(function),
            other => Value::Stream(other),
        }
    }
}

impl PartialEq for Stream {
    /// Streams are equal when they have the same kind and refer to the same object
    fn eq(&self, other: &Self) -> bool {
        use Stream::*;

        match (self, other) {
            (File(a), File(b)) => a == b,
            (Mark(a), Mark(b)) => Ptr::ptr_eq(a, b),
            (Buffer(a), Buffer(b)) | (BufferAppend(a), BufferAppend(b)) => Ptr::ptr_eq(a, b),
            (StringInput(a), StringInput(b)) => Ptr::ptr_eq(a, b),
            (StringOutput(a), StringOutput(b)) => Ptr::ptr_eq(a, b),
            (BufferPosition(a), BufferPosition(b)) => Ptr::ptr_eq(&a.position, &b.position),
            (Callable(a), Callable(b)) => a == b,
            (Process(a), Process(b)) => Ptr::ptr_eq(a, b),
            (StatusLine, StatusLine) | (Default, Default) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Value::from(self.clone()).display_string())
    }
}
