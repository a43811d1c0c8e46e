use crate::{Result, RillSend, RillSync, StreamRuntime, Value};
use rill_memory::{Ptr, make_ptr};
use std::fmt;

/// A trait for host functions that can be called by the stream layer
pub trait StreamFunction:
    Fn(&mut CallContext) -> Result<Value> + RillSend + RillSync + 'static
{
}

impl<T> StreamFunction for T where
    T: Fn(&mut CallContext) -> Result<Value> + RillSend + RillSync + 'static
{
}

/// A callable value, usable as a stream or as a library function
///
/// When used as a stream, the function is called with no arguments to read a character, with
/// a character code to push back or write a character, and with a string to write a block.
#[derive(Clone)]
pub struct Callable {
    // The type signature can't be simplified without stabilized trait aliases
    #[allow(clippy::type_complexity)]
    function: Ptr<dyn StreamFunction>,
}

impl Callable {
    /// Creates a new callable from a host function
    pub fn new(function: impl StreamFunction) -> Self {
        Self {
            function: make_ptr!(function),
        }
    }

    /// Calls the function with the given arguments
    ///
    /// Stream dispatch calls functions via [StreamRuntime::call], which defers collection for
    /// the duration of the call.
    pub fn call(&self, runtime: &mut StreamRuntime, args: &[Value]) -> Result<Value> {
        (self.function)(&mut CallContext { runtime, args })
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Ptr::ptr_eq(&self.function, &other.function)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#<function>")
    }
}

/// The context provided when a [Callable] is called
pub struct CallContext<'a> {
    /// The runtime making the call
    ///
    /// Functions can use the runtime to perform stream operations of their own, including
    /// calls back into other callable streams.
    pub runtime: &'a mut StreamRuntime,
    args: &'a [Value],
}

impl<'a> CallContext<'a> {
    /// Returns a new context for calling a function
    pub fn new(runtime: &'a mut StreamRuntime, args: &'a [Value]) -> Self {
        Self { runtime, args }
    }

    /// Returns the call's arguments
    pub fn args(&self) -> &'a [Value] {
        self.args
    }
}
