//! Character-level stream operations
//!
//! Each operation dispatches on the stream's kind. The default stream is resolved to the
//! current standard input or output binding before dispatching.

use crate::{
    BufferRef, MarkRef, Position, Result, Stream, StreamRuntime, Value,
    error::invalid_stream, position, value::char_from_int,
};

impl StreamRuntime {
    /// Reads the next character from a stream, returning `None` at the end of input
    pub fn read_char(&mut self, stream: &Stream) -> Result<Option<char>> {
        match stream {
            Stream::Default => match self.standard_input() {
                Some(Stream::Default) | None => Ok(None),
                Some(resolved) => self.read_char(&resolved),
            },
            Stream::File(file) => file.read_char(),
            Stream::Mark(mark) => {
                let (buffer, mut position) = resident_mark(mark)?;
                let result = position::read_char(&*buffer.borrow(), &mut position)?;
                mark.borrow_mut().position = position;
                Ok(result)
            }
            Stream::Buffer(buffer) => {
                let mut buffer = buffer.borrow_mut();
                let mut point = buffer.point();
                let result = position::read_char(&*buffer, &mut point)?;
                buffer.set_point(point);
                Ok(result)
            }
            Stream::StringInput(input) => Ok(input.borrow_mut().read_char()),
            Stream::BufferPosition(stream) => {
                let buffer = stream.buffer.borrow();
                position::read_char(&*buffer, &mut stream.position.borrow_mut())
            }
            Stream::Callable(function) => {
                let result = self.call(function, &[])?;
                Ok(match result {
                    Value::Int(n) => char_from_int(n),
                    _ => None,
                })
            }
            Stream::Process(_) => {
                invalid_stream(stream.clone(), Some("processes can only be written to"))
            }
            Stream::StringOutput(_) | Stream::BufferAppend(_) | Stream::StatusLine => {
                invalid_stream(stream.clone(), Some("not an input stream"))
            }
        }
    }

    /// Pushes a character back onto a stream, returning true on success
    ///
    /// File streams can only hold a single pushed-back character. Positional streams step
    /// back over the previous character, the character that's passed in is ignored.
    pub fn unread_char(&mut self, stream: &Stream, c: char) -> Result<bool> {
        match stream {
            Stream::Default => match self.standard_input() {
                Some(Stream::Default) | None => Ok(false),
                Some(resolved) => self.unread_char(&resolved, c),
            },
            Stream::File(file) => Ok(file.unread_char(c)),
            Stream::Mark(mark) => {
                let (buffer, mut position) = resident_mark(mark)?;
                let result = position::unread_char(&*buffer.borrow(), &mut position);
                mark.borrow_mut().position = position;
                Ok(result)
            }
            Stream::Buffer(buffer) => {
                let mut buffer = buffer.borrow_mut();
                let mut point = buffer.point();
                let result = position::unread_char(&*buffer, &mut point);
                buffer.set_point(point);
                Ok(result)
            }
            Stream::StringInput(input) => Ok(input.borrow_mut().unread_char()),
            Stream::BufferPosition(stream) => {
                let buffer = stream.buffer.borrow();
                Ok(position::unread_char(&*buffer, &mut stream.position.borrow_mut()))
            }
            Stream::Callable(function) => {
                let result = self.call(function, &[Value::from(c)])?;
                Ok(!result.is_nil())
            }
            Stream::StringOutput(_)
            | Stream::BufferAppend(_)
            | Stream::Process(_)
            | Stream::StatusLine => Ok(false),
        }
    }

    /// Writes a single character to a stream, returning the number of characters written
    pub fn write_char(&mut self, stream: &Stream, c: char) -> Result<usize> {
        match stream {
            Stream::Default => match self.standard_output() {
                Some(Stream::Default) | None => Ok(0),
                Some(resolved) => self.write_char(&resolved, c),
            },
            Stream::Callable(function) => {
                let result = self.call(function, &[Value::from(c)])?;
                Ok(if result.is_nil() { 0 } else { 1 })
            }
            _ => {
                let mut buffer = [0; 4];
                self.write_str(stream, c.encode_utf8(&mut buffer))
            }
        }
    }

    /// Writes a string to a stream, returning the number of characters written
    ///
    /// Process streams report the number of bytes accepted by the process.
    pub fn write_str(&mut self, stream: &Stream, text: &str) -> Result<usize> {
        match stream {
            Stream::Default => match self.standard_output() {
                Some(Stream::Default) | None => Ok(0),
                Some(resolved) => self.write_str(&resolved, text),
            },
            Stream::File(file) => file.write_str(text),
            Stream::Mark(mark) => {
                let (buffer, mut position) = resident_mark(mark)?;
                let written = position::write_str(&mut *buffer.borrow_mut(), &mut position, text)?;
                mark.borrow_mut().position = position;
                Ok(written)
            }
            Stream::Buffer(buffer) => write_at_point(buffer, text),
            Stream::StringOutput(sink) => {
                sink.borrow_mut().append(text);
                Ok(text.chars().count())
            }
            Stream::BufferPosition(stream) => position::write_str(
                &mut *stream.buffer.borrow_mut(),
                &mut stream.position.borrow_mut(),
                text,
            ),
            Stream::BufferAppend(buffer) => {
                let mut buffer = buffer.borrow_mut();
                let mut end = buffer.logical_end();
                position::write_str(&mut *buffer, &mut end, text)
            }
            Stream::Callable(function) => {
                let count = text.chars().count();
                let result = self.call(function, &[Value::from(text)])?;
                Ok(match result {
                    Value::Int(n) => usize::try_from(n).unwrap_or(0),
                    Value::Nil => 0,
                    _ => count,
                })
            }
            Stream::Process(process) => {
                let mut process = process.borrow_mut();
                if process.is_running() {
                    process.write_stdin(text.as_bytes())
                } else {
                    Ok(0)
                }
            }
            Stream::StatusLine => {
                let mut status_line = self.status_line().borrow_mut();
                if status_line.message_pending() {
                    status_line.append_message(text);
                    status_line.request_redraw();
                } else {
                    status_line.start_message(text);
                }
                Ok(text.chars().count())
            }
            Stream::StringInput(_) => invalid_stream(stream.clone(), Some("not an output stream")),
        }
    }
}

fn resident_mark(mark: &MarkRef) -> Result<(BufferRef, Position)> {
    let state = mark.borrow();
    match state.buffer() {
        Some(buffer) => Ok((buffer.clone(), state.position)),
        None => invalid_stream(
            Value::Mark(mark.clone()),
            Some("marks used as streams must be resident"),
        ),
    }
}

fn write_at_point(buffer: &BufferRef, text: &str) -> Result<usize> {
    let mut buffer = buffer.borrow_mut();
    let mut point = buffer.point();
    let written = position::write_str(&mut *buffer, &mut point, text)?;
    buffer.set_point(point);
    Ok(written)
}
