use rill_streams::{Callable, PtrMut, RillSend, RillSync, Value, make_ptr_mut};

/// Records the arguments of every call made to callables that it makes
#[derive(Clone, Default)]
pub struct RecordingCallable {
    calls: PtrMut<Vec<Vec<Value>>>,
}

impl RecordingCallable {
    /// Makes a callable that records its arguments, then responds with the result of `respond`
    pub fn callable(
        &self,
        respond: impl Fn(&[Value]) -> Value + RillSend + RillSync + 'static,
    ) -> Callable {
        let calls = self.calls.clone();
        Callable::new(move |ctx| {
            calls.borrow_mut().push(ctx.args().to_vec());
            Ok(respond(ctx.args()))
        })
    }

    /// Makes a callable that reads characters from `text`, and accepts everything written to it
    ///
    /// Push-backs are accepted and step back through `text`.
    pub fn source(&self, text: &str) -> Callable {
        let chars: Vec<char> = text.chars().collect();
        let index: PtrMut<usize> = make_ptr_mut!(0usize);
        self.callable(move |args| {
            let mut index = index.borrow_mut();
            match args {
                [] => match chars.get(*index) {
                    Some(c) => {
                        *index += 1;
                        Value::from(*c)
                    }
                    None => Value::Nil,
                },
                [Value::Int(_)] if *index > 0 => {
                    *index -= 1;
                    Value::True
                }
                _ => Value::Nil,
            }
        })
    }

    /// The arguments of each call, in order
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.calls.borrow().clone()
    }

    /// The number of calls that have been made
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}
