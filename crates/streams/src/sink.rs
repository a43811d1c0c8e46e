use rill_memory::Ptr;

/// An append-only text buffer that grows by doubling
///
/// Storage is managed explicitly so that the logical length stays distinct from the capacity,
/// and one slot past the logical length always holds a terminator.
#[derive(Debug)]
pub struct StringSink {
    storage: Vec<u8>,
    len: usize,
}

const MIN_GROWTH: usize = 32;

impl Default for StringSink {
    fn default() -> Self {
        Self {
            storage: vec![0],
            len: 0,
        }
    }
}

impl StringSink {
    /// Appends text to the end of the sink
    pub fn append(&mut self, text: &str) {
        self.append_bytes(text.as_bytes());
    }

    /// Appends a single character
    pub fn push(&mut self, c: char) {
        let mut buffer = [0; 4];
        self.append(c.encode_utf8(&mut buffer));
    }

    fn append_bytes(&mut self, bytes: &[u8]) {
        let new_len = self.len + bytes.len();
        if new_len + 1 >= self.capacity() {
            let doubled = if self.capacity() < MIN_GROWTH / 2 {
                MIN_GROWTH
            } else {
                self.capacity() * 2
            };
            let mut storage = vec![0; doubled.max(new_len + 1)];
            storage[..self.len].copy_from_slice(&self.storage[..self.len]);
            self.storage = storage;
        }

        self.storage[self.len..new_len].copy_from_slice(bytes);
        self.storage[new_len] = 0;
        self.len = new_len;
    }

    /// The number of bytes that have been appended since the last reset
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing has been appended since the last reset
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The size of the allocated storage, including the terminator slot
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// The sink's current contents
    pub fn as_str(&self) -> &str {
        // Only whole strings are ever appended
        std::str::from_utf8(&self.storage[..self.len]).unwrap_or_default()
    }

    /// Returns a copy of the contents, sized to the logical length
    pub fn to_ptr(&self) -> Ptr<str> {
        Ptr::from(self.as_str())
    }

    /// Returns a copy of the contents and resets the sink
    ///
    /// Subsequent extractions only contain text appended after this call.
    pub fn extract(&mut self) -> Ptr<str> {
        let result = self.to_ptr();
        *self = Self::default();
        result
    }
}
