use crate::{Position, Value};
use std::{error, fmt, io};
use thiserror::Error;

/// The different error types that can be raised by stream operations
#[derive(Error, Clone)]
#[allow(missing_docs)]
pub enum ErrorKind {
    #[error("{0}")]
    StringError(String),
    /// The value isn't a stream, or the stream doesn't support the requested operation
    #[error("Invalid stream: {}{}", stream.display_string(), reason_suffix(reason))]
    InvalidStream {
        stream: Value,
        reason: Option<&'static str>,
    },
    /// An OS-level failure while opening or using a file
    #[error("File error: {message} (code {code}): {name}")]
    FileError {
        code: i32,
        name: String,
        message: String,
    },
    /// A public operation was given an argument with the wrong type or an out-of-range value
    ///
    /// `index` is the 1-based position of the offending argument.
    #[error("Bad argument {index}: {}", value.display_string())]
    ArgumentError { index: usize, value: Value },
    #[error("Expected {expected}, but found {}", get_value_types(unexpected))]
    UnexpectedArguments {
        expected: String,
        unexpected: Vec<Value>,
    },
    #[error("Missing argument {index}")]
    MissingArgument { index: usize },
    #[error("Buffer is read-only: {buffer}")]
    BufferReadOnly { buffer: String },
    #[error("Position ({}, {}) is outside the buffer's restriction", position.col, position.row)]
    InvalidPosition { position: Position },
    #[error("Interrupted")]
    Interrupted,
}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// An error raised by the stream layer
#[derive(Clone, Debug)]
pub struct Error {
    /// The kind of error that was raised
    pub error: ErrorKind,
}

impl Error {
    /// Initializes an error with the given error kind
    pub fn new(error: ErrorKind) -> Self {
        Self { error }
    }

    /// Returns true if the error was raised because an interrupt was requested
    pub fn is_interrupt(&self) -> bool {
        matches!(self.error, ErrorKind::Interrupted)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl error::Error for Error {}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Self::new(ErrorKind::StringError(error))
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Self::new(ErrorKind::StringError(error.into()))
    }
}

impl From<ErrorKind> for Error {
    fn from(error: ErrorKind) -> Self {
        Self::new(error)
    }
}

/// The Result type used by the stream layer
pub type Result<T> = std::result::Result<T, Error>;

/// Creates a [crate::Error] from a message (with format-like behaviour), wrapped in `Err`
#[macro_export]
macro_rules! runtime_error {
    ($error:literal) => {
        Err($crate::Error::from(format!($error)))
    };
    ($error:expr) => {
        Err($crate::Error::from($error))
    };
    ($error:literal, $($y:expr),+ $(,)?) => {
        Err($crate::Error::from(format!($error, $($y),+)))
    };
}

/// Creates an error that reports an unsupported stream value
pub fn invalid_stream<T>(stream: impl Into<Value>, reason: Option<&'static str>) -> Result<T> {
    Err(ErrorKind::InvalidStream {
        stream: stream.into(),
        reason,
    }
    .into())
}

/// Creates an error that reports a bad argument at the given 1-based position
pub fn argument_error<T>(value: &Value, index: usize) -> Result<T> {
    Err(ErrorKind::ArgumentError {
        index,
        value: value.clone(),
    }
    .into())
}

/// Creates an error that reports unexpected arguments in a call to a library function
pub fn unexpected_args<T>(expected: &str, unexpected: &[Value]) -> Result<T> {
    Err(ErrorKind::UnexpectedArguments {
        expected: expected.into(),
        unexpected: unexpected.to_vec(),
    }
    .into())
}

/// Creates an error that reports a missing argument at the given 1-based position
pub fn missing_argument<T>(index: usize) -> Result<T> {
    Err(ErrorKind::MissingArgument { index }.into())
}

/// Converts an [io::Error] raised for the named file into a [ErrorKind::FileError]
pub fn map_io_err(error: io::Error, name: &str) -> Error {
    ErrorKind::FileError {
        code: error.raw_os_error().unwrap_or(-1),
        name: name.to_string(),
        message: error.to_string(),
    }
    .into()
}

fn get_value_types(values: &[Value]) -> String {
    match values {
        [] => "no args".to_string(),
        [single_value] => single_value.type_as_string().to_string(),
        _ => {
            let types: Vec<_> = values.iter().map(Value::type_as_string).collect();
            format!("({})", types.join(", "))
        }
    }
}

fn reason_suffix(reason: &Option<&'static str>) -> String {
    reason.map(|reason| format!(" ({reason})")).unwrap_or_default()
}
