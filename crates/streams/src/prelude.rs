//! A collection of useful items to make it easier to work with `rill_streams`

#[doc(inline)]
pub use crate::{
    CallContext, Callable, DisplayContext, File, FileHandle, Position, Ptr, PtrMut, RillSend,
    RillSync, Stream, StreamFunction, StreamRuntime, StreamSettings, TextBuffer, Value,
    make_ptr, make_ptr_mut, runtime_error, unexpected_args,
};
