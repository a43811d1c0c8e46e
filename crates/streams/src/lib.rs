//! A polymorphic character stream layer for the Rill Lisp interpreter
//!
//! Files, editor buffers, marks, strings, host functions, subprocesses and the status line
//! can all be read from or written to through the same small set of operations on
//! [StreamRuntime].
//!
//! ```
//! use rill_streams::{Stream, StreamRuntime};
//!
//! let mut runtime = StreamRuntime::new();
//! let output = Stream::string_output();
//! runtime.write_str(&output, "hello").unwrap();
//! runtime.write_char(&output, '!').unwrap();
//! assert_eq!(&*output.take_output().unwrap(), "hello!");
//! ```

#![warn(missing_docs)]

mod buffer;
mod callable;
mod dispatch;
mod display_context;
mod error;
mod escape;
mod io;
mod ops;
mod process;
mod runtime;
mod send_sync;
mod sink;
mod status_line;
mod stream;
mod value;

pub mod core_lib;
pub mod position;
pub mod prelude;

pub use crate::{
    buffer::{BufferRef, LineBuffer, Mark, MarkRef, Position, Restriction, TextBuffer},
    callable::{CallContext, Callable, StreamFunction},
    display_context::DisplayContext,
    error::{
        Error, ErrorKind, Result, argument_error, invalid_stream, map_io_err, missing_argument,
        unexpected_args,
    },
    escape::Escape,
    io::{
        BufferedFile, DefaultStderr, DefaultStdin, DefaultStdout, File, FileHandle, FileRegistry,
        SweepStats, SystemStderr, SystemStdin, SystemStdout, UnavailableStderr, UnavailableStdin,
        UnavailableStdout,
    },
    process::{ChildProcess, Process, ProcessRef},
    runtime::{InterruptFlag, StreamRuntime, StreamSettings},
    send_sync::{RillSend, RillSync},
    sink::StringSink,
    status_line::{StatusLine, StatusMessage},
    stream::{BufferPosition, Stream, StringInput, is_stream},
    value::Value,
};
pub use rill_memory::{Borrow, BorrowMut, Ptr, PtrMut, RCell, WeakPtr, lazy, make_ptr, make_ptr_mut};
