//! Named tables of library functions for use by an interpreter

pub mod streams;

use crate::{Callable, Result, StreamFunction, StreamRuntime, Value, runtime_error};
use indexmap::IndexMap;

/// A named collection of library functions
pub struct Module {
    name: &'static str,
    functions: IndexMap<&'static str, Callable>,
}

impl Module {
    /// Makes an empty module with the given name
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            functions: IndexMap::new(),
        }
    }

    /// The module's name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Adds a function to the module, replacing any existing function with the same name
    pub fn add_fn(&mut self, name: &'static str, function: impl StreamFunction) {
        self.functions.insert(name, Callable::new(function));
    }

    /// Returns the function with the given name
    pub fn get(&self, name: &str) -> Option<&Callable> {
        self.functions.get(name)
    }

    /// Calls the named function with the given arguments
    pub fn call(&self, runtime: &mut StreamRuntime, name: &str, args: &[Value]) -> Result<Value> {
        match self.get(name) {
            Some(function) => function.call(runtime, args),
            None => runtime_error!("'{name}' not found in module '{}'", self.name),
        }
    }

    /// The names of the module's functions, in the order they were added
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }

    /// The number of functions in the module
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if the module has no functions
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
