use crate::{
    Callable, DefaultStderr, DefaultStdin, DefaultStdout, FileHandle, FileRegistry, Result,
    StatusLine, StatusMessage, Stream, SweepStats, Value,
};
use rill_memory::{PtrMut, make_ptr_mut};
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tracing::debug;

/// A flag that's set when the user asks for a long-running operation to stop
///
/// The flag can be shared with other threads, e.g. a signal handler. Long-running operations
/// poll the flag and return an `Interrupted` error when it's set. The flag stays set until
/// it's cleared.
#[derive(Clone, Debug, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    /// Sets the flag
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clears the flag
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Returns true if an interrupt has been requested
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The settings used when making a [StreamRuntime]
pub struct StreamSettings {
    /// The maximum number of bytes returned by a single line read from a file
    pub line_limit: usize,

    /// The number of characters moved at a time when copying between streams
    pub copy_block_size: usize,

    /// The handle used for the stdin file alias
    pub stdin: Box<dyn FileHandle>,

    /// The handle used for the stdout file alias
    pub stdout: Box<dyn FileHandle>,

    /// The handle used for the stderr file alias
    pub stderr: Box<dyn FileHandle>,

    /// The status line that's written to via the `t` stream
    pub status_line: PtrMut<dyn StatusLine>,

    /// The initial standard input binding
    ///
    /// If `None`, the stdin file alias is used.
    pub standard_input: Option<Stream>,

    /// The initial standard output binding
    ///
    /// If `None`, the stdout file alias is used.
    pub standard_output: Option<Stream>,

    /// The flag that's polled by long-running operations
    pub interrupt: InterruptFlag,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            line_limit: 399,
            copy_block_size: 512,
            stdin: Box::new(DefaultStdin::default()),
            stdout: Box::new(DefaultStdout::default()),
            stderr: Box::new(DefaultStderr::default()),
            status_line: make_ptr_mut!(StatusMessage::default()),
            standard_input: None,
            standard_output: None,
            interrupt: InterruptFlag::default(),
        }
    }
}

#[derive(Clone)]
enum Binding {
    Standard,
    Stream(Stream),
    Unbound,
}

impl From<Option<Stream>> for Binding {
    fn from(stream: Option<Stream>) -> Self {
        match stream {
            Some(stream) => Self::Stream(stream),
            None => Self::Unbound,
        }
    }
}

#[derive(Default)]
struct CollectionState {
    deferral_depth: usize,
    pending: bool,
}

/// The context in which stream operations are performed
///
/// The runtime owns the file registry, the standard input and output bindings, and the
/// status line. Stream operations are implemented as methods on the runtime.
pub struct StreamRuntime {
    files: FileRegistry,
    standard_input: Binding,
    standard_output: Binding,
    status_line: PtrMut<dyn StatusLine>,
    interrupt: InterruptFlag,
    collection: CollectionState,
    pub(crate) line_limit: usize,
    pub(crate) copy_block_size: usize,
}

impl Default for StreamRuntime {
    fn default() -> Self {
        Self::with_settings(StreamSettings::default())
    }
}

impl StreamRuntime {
    /// Makes a runtime with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a runtime with the given settings
    pub fn with_settings(settings: StreamSettings) -> Self {
        let binding = |stream: Option<Stream>| match stream {
            Some(stream) => Binding::Stream(stream),
            None => Binding::Standard,
        };

        Self {
            files: FileRegistry::new(settings.stdin, settings.stdout, settings.stderr),
            standard_input: binding(settings.standard_input),
            standard_output: binding(settings.standard_output),
            status_line: settings.status_line,
            interrupt: settings.interrupt,
            collection: CollectionState::default(),
            line_limit: settings.line_limit.max(1),
            copy_block_size: settings.copy_block_size.max(1),
        }
    }

    /// The runtime's file registry
    pub fn files(&mut self) -> &mut FileRegistry {
        &mut self.files
    }

    /// The status line used by the `t` stream
    pub fn status_line(&self) -> &PtrMut<dyn StatusLine> {
        &self.status_line
    }

    /// The flag that's polled by long-running operations
    pub fn interrupt_flag(&self) -> &InterruptFlag {
        &self.interrupt
    }

    pub(crate) fn check_interrupt(&self) -> Result<()> {
        if self.interrupt.is_requested() {
            debug!("interrupt observed");
            Err(crate::ErrorKind::Interrupted.into())
        } else {
            Ok(())
        }
    }

    /// The stream that the default stream reads from, if one is bound
    pub fn standard_input(&mut self) -> Option<Stream> {
        match &self.standard_input {
            Binding::Standard => Some(Stream::File(self.files.stdin())),
            Binding::Stream(stream) => Some(stream.clone()),
            Binding::Unbound => None,
        }
    }

    /// The stream that the default stream writes to, if one is bound
    pub fn standard_output(&mut self) -> Option<Stream> {
        match &self.standard_output {
            Binding::Standard => Some(Stream::File(self.files.stdout())),
            Binding::Stream(stream) => Some(stream.clone()),
            Binding::Unbound => None,
        }
    }

    /// Rebinds standard input, returning the previous binding
    ///
    /// With no binding, reads from the default stream return end of input.
    pub fn set_standard_input(&mut self, stream: Option<Stream>) -> Option<Stream> {
        let previous = self.standard_input();
        self.standard_input = stream.into();
        previous
    }

    /// Rebinds standard output, returning the previous binding
    ///
    /// With no binding, writes to the default stream are discarded.
    pub fn set_standard_output(&mut self, stream: Option<Stream>) -> Option<Stream> {
        let previous = self.standard_output();
        self.standard_output = stream.into();
        previous
    }

    /// Calls `f` with standard input bound to `stream`, restoring the previous binding afterwards
    pub fn with_standard_input<T>(&mut self, stream: Stream, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = std::mem::replace(&mut self.standard_input, Binding::Stream(stream));
        let result = f(self);
        self.standard_input = previous;
        result
    }

    /// Calls `f` with standard output bound to `stream`, restoring the previous binding
    /// afterwards
    pub fn with_standard_output<T>(
        &mut self,
        stream: Stream,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let previous = std::mem::replace(&mut self.standard_output, Binding::Stream(stream));
        let result = f(self);
        self.standard_output = previous;
        result
    }

    /// Calls a function with collection deferred for the duration of the call
    pub fn call(&mut self, function: &Callable, args: &[Value]) -> Result<Value> {
        self.defer_collection(|runtime| function.call(runtime, args))
    }

    /// Runs `f` with collection deferred
    ///
    /// Collections requested while deferred are run when the outermost deferred section
    /// exits, whether or not `f` succeeded.
    pub fn defer_collection<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.collection.deferral_depth += 1;
        let result = f(self);
        self.collection.deferral_depth -= 1;

        if self.collection.deferral_depth == 0 && self.collection.pending {
            debug!("running deferred collection");
            self.collect_garbage();
        }

        result
    }

    /// Returns true if collection is currently deferred
    pub fn is_collection_deferred(&self) -> bool {
        self.collection.deferral_depth > 0
    }

    /// Sweeps the file registry, or marks a sweep as pending if collection is deferred
    ///
    /// Returns `None` when the sweep was deferred.
    pub fn collect_garbage(&mut self) -> Option<SweepStats> {
        if self.is_collection_deferred() {
            debug!("collection deferred");
            self.collection.pending = true;
            None
        } else {
            self.collection.pending = false;
            Some(self.files.sweep())
        }
    }

    /// Closes every open file apart from the standard stream aliases
    pub fn shutdown(&mut self) {
        self.files.shutdown();
    }
}

impl fmt::Debug for StreamRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamRuntime")
            .field("files", &self.files.len())
            .field("deferral_depth", &self.collection.deferral_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn runtime() -> StreamRuntime {
        StreamRuntime::with_settings(StreamSettings {
            stdin: Box::new(io::empty()),
            stdout: Box::new(io::empty()),
            stderr: Box::new(io::empty()),
            ..Default::default()
        })
    }

    #[test]
    fn collection_is_deferred_until_the_outermost_section_exits() {
        let mut runtime = runtime();
        drop(runtime.files().make_file());

        runtime.defer_collection(|runtime| {
            runtime.defer_collection(|runtime| {
                assert_eq!(runtime.collect_garbage(), None);
            });
            assert!(runtime.is_collection_deferred());
            assert!(runtime.collection.pending);
        });

        assert!(!runtime.is_collection_deferred());
        assert!(!runtime.collection.pending);
        assert_eq!(runtime.files().sweep().released, 0);
    }

    #[test]
    fn deferral_is_unwound_on_error() {
        let mut runtime = runtime();
        let function = Callable::new(|_| crate::runtime_error!("boom"));
        assert!(runtime.call(&function, &[]).is_err());
        assert!(!runtime.is_collection_deferred());
        assert!(runtime.collect_garbage().is_some());
    }

    #[test]
    fn bindings_can_be_replaced_and_restored() {
        let mut runtime = runtime();
        assert!(matches!(runtime.standard_output(), Some(Stream::File(_))));

        let output = Stream::string_output();
        let previous = runtime.set_standard_output(Some(output.clone()));
        assert!(matches!(previous, Some(Stream::File(_))));
        assert_eq!(runtime.standard_output(), Some(output.clone()));

        let inner = Stream::string_output();
        runtime.with_standard_output(inner.clone(), |runtime| {
            assert_eq!(runtime.standard_output(), Some(inner));
        });
        assert_eq!(runtime.standard_output(), Some(output));

        runtime.set_standard_output(None);
        assert_eq!(runtime.standard_output(), None);
    }

    #[test]
    fn interrupts_stay_requested_until_cleared() {
        let runtime = runtime();
        let flag = runtime.interrupt_flag().clone();
        assert!(runtime.check_interrupt().is_ok());
        flag.request();
        assert!(runtime.check_interrupt().is_err());
        assert!(runtime.check_interrupt().is_err());
        flag.clear();
        assert!(runtime.check_interrupt().is_ok());
    }
}
