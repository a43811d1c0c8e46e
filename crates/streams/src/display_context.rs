use std::fmt::{self, Write};

/// Accumulates the printed representation of values
///
/// A context either produces the readable form, where strings are quoted and their special
/// characters escaped so that the reader can read them back, or the plain form, where strings
/// are written as-is.
#[derive(Default)]
pub struct DisplayContext {
    output: String,
    quoted: bool,
}

impl DisplayContext {
    /// Makes a display context that produces the plain form
    pub fn plain() -> Self {
        Self::default()
    }

    /// Makes a display context that produces the readable, quoted form
    pub fn quoted() -> Self {
        Self {
            output: String::new(),
            quoted: true,
        }
    }

    /// Appends text to the output without any escaping
    pub fn append(&mut self, text: impl AsRef<str>) {
        self.output.push_str(text.as_ref());
    }

    /// Appends a single character to the output without any escaping
    pub fn append_char(&mut self, c: char) {
        self.output.push(c);
    }

    /// Appends a string literal
    ///
    /// In the plain form the string is appended unchanged.
    pub fn append_string_literal(&mut self, s: &str) {
        if !self.quoted {
            self.append(s);
            return;
        }

        self.output.push('"');
        for c in s.chars() {
            match escape_name(c) {
                Some(name) => {
                    self.output.push('\\');
                    self.output.push(name);
                }
                None if c.is_control() && (c as u32) < 0o400 => {
                    // Writing to a String can't fail
                    let _ = write!(self.output, "\\{:03o}", c as u32);
                }
                None => self.output.push(c),
            }
        }
        self.output.push('"');
    }

    /// Returns true if strings should be quoted and escaped
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Returns the accumulated output and consumes the context
    pub fn result(self) -> String {
        self.output
    }
}

impl Write for DisplayContext {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append(s);
        Ok(())
    }
}

/// The character that follows a backslash in the escaped form of `c`, if it has a named escape
fn escape_name(c: char) -> Option<char> {
    let name = match c {
        '"' => '"',
        '\\' => '\\',
        '\n' => 'n',
        '\t' => 't',
        '\r' => 'r',
        '\x0c' => 'f',
        '\x0b' => 'v',
        '\x07' => 'a',
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_literals() {
        let mut ctx = DisplayContext::quoted();
        ctx.append_string_literal("a\"b\\c\n\x01é");
        assert_eq!(ctx.result(), "\"a\\\"b\\\\c\\n\\001é\"");

        let mut ctx = DisplayContext::plain();
        ctx.append_string_literal("a\"b\n");
        assert_eq!(ctx.result(), "a\"b\n");
    }
}
