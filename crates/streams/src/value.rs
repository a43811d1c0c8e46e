use crate::{BufferRef, Callable, DisplayContext, File, MarkRef, ProcessRef, Stream};
use rill_memory::Ptr;
use std::fmt::{self, Write};

/// The host values that the stream layer consumes and produces
///
/// Only the kinds of value that can take part in stream operations are represented.
#[derive(Clone, Default)]
pub enum Value {
    /// The empty value, also the false value
    #[default]
    Nil,
    /// The true value
    True,
    /// An integer, also used to represent characters by their code point
    Int(i64),
    /// An immutable string
    Str(Ptr<str>),
    /// A file object
    File(File),
    /// An editor buffer
    Buffer(BufferRef),
    /// A mark in an editor buffer
    Mark(MarkRef),
    /// A subprocess
    Process(ProcessRef),
    /// A callable host function
    Function(Callable),
    /// A stream that has no other value representation, e.g. a string-output stream
    Stream(Stream),
}

impl Value {
    /// Returns true if the value is `Nil`
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns the value as a character, if it's an integer in the valid code point range
    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Int(n) => char_from_int(*n),
            _ => None,
        }
    }

    /// Returns a name for the value's type
    pub fn type_as_string(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::True => "t",
            Self::Int(_) => "integer",
            Self::Str(_) => "string",
            Self::File(_) => "file",
            Self::Buffer(_) => "buffer",
            Self::Mark(_) => "mark",
            Self::Process(_) => "process",
            Self::Function(_) => "function",
            Self::Stream(_) => "stream",
        }
    }

    /// Writes the value's printed representation to the display context
    pub fn display(&self, ctx: &mut DisplayContext) {
        match self {
            Self::Nil => ctx.append("nil"),
            Self::True => ctx.append_char('t'),
            Self::Int(n) => ctx.append(n.to_string()),
            Self::Str(s) => ctx.append_string_literal(s),
            Self::File(file) => file.display(ctx),
            Self::Buffer(buffer) => {
                ctx.append("#<buffer ");
                ctx.append(buffer.borrow().name());
                ctx.append_char('>');
            }
            Self::Mark(mark) => {
                let mark = mark.borrow();
                match mark.buffer() {
                    Some(buffer) => {
                        let _ = write!(
                            ctx,
                            "#<mark {} {}>",
                            buffer.borrow().name(),
                            mark.position
                        );
                    }
                    None => ctx.append("#<mark *non-resident*>"),
                }
            }
            Self::Process(process) => {
                ctx.append("#<process ");
                ctx.append(process.borrow().name());
                ctx.append_char('>');
            }
            Self::Function(_) => ctx.append("#<function>"),
            Self::Stream(stream) => {
                ctx.append("#<stream ");
                ctx.append(stream.kind_name());
                ctx.append_char('>');
            }
        }
    }

    /// Returns the readable printed representation of the value
    pub fn display_string(&self) -> String {
        let mut ctx = DisplayContext::quoted();
        self.display(&mut ctx);
        ctx.result()
    }
}

pub(crate) fn char_from_int(n: i64) -> Option<char> {
    u32::try_from(n).ok().and_then(char::from_u32)
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

impl PartialEq for Value {
    /// Integers and strings are compared by value, everything else by identity
    fn eq(&self, other: &Self) -> bool {
        use Value::*;

        match (self, other) {
            (Nil, Nil) | (True, True) => true,
            (Int(a), Int(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (File(a), File(b)) => a == b,
            (Buffer(a), Buffer(b)) => Ptr::ptr_eq(a, b),
            (Mark(a), Mark(b)) => Ptr::ptr_eq(a, b),
            (Process(a), Process(b)) => Ptr::ptr_eq(a, b),
            (Function(a), Function(b)) => a == b,
            (Stream(a), Stream(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::Nil }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Self::Int(value as i64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

impl From<Ptr<str>> for Value {
    fn from(value: Ptr<str>) -> Self {
        Self::Str(value)
    }
}

impl From<File> for Value {
    fn from(value: File) -> Self {
        Self::File(value)
    }
}

impl From<Callable> for Value {
    fn from(value: Callable) -> Self {
        Self::Function(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Self::Nil,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(value: &Value) -> String {
        let mut ctx = DisplayContext::plain();
        value.display(&mut ctx);
        ctx.result()
    }

    #[test]
    fn strings_are_escaped_in_the_quoted_form() {
        let value = Value::from("a \"b\"\n\\\u{1}");
        assert_eq!(value.display_string(), r#""a \"b\"\n\\\001""#);
        assert_eq!(plain(&value), "a \"b\"\n\\\u{1}");
    }

    #[test]
    fn scalars() {
        assert_eq!(Value::Nil.display_string(), "nil");
        assert_eq!(Value::True.display_string(), "t");
        assert_eq!(Value::from(-42i64).display_string(), "-42");
        assert_eq!(Value::from('A'), Value::Int(65));
        assert_eq!(Value::from(false), Value::Nil);
    }

    #[test]
    fn chars_from_ints() {
        assert_eq!(Value::Int(0x41).as_char(), Some('A'));
        assert_eq!(Value::Int(-1).as_char(), None);
        assert_eq!(Value::Int(0xd800).as_char(), None);
        assert_eq!(Value::from("A").as_char(), None);
    }
}
