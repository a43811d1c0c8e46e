use crate::{Result, Stream, StreamRuntime};

/// The result of decoding an escape sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Escape {
    /// The character the sequence stands for
    pub resolved: char,
    /// The character that was read after the sequence, or `None` if input ended
    ///
    /// Decoding always consumes one character past the sequence, callers that don't need it
    /// can push it back.
    pub next: Option<char>,
}

impl StreamRuntime {
    /// Decodes the body of an escape sequence, `first` being the character after the backslash
    ///
    /// - `n`, `r`, `f`, `t`, `v`, `a` are the usual control characters.
    /// - `^X` is the control character for `X`.
    /// - One to three octal digits give a character code.
    /// - `x` followed by any number of hex digits gives a character code, with no digits the
    ///   result is NUL.
    /// - Any other character stands for itself.
    ///
    /// Codes that aren't valid characters decode to U+FFFD.
    pub fn read_escape(&mut self, stream: &Stream, first: char) -> Result<Escape> {
        let resolved = match first {
            'n' => '\n',
            'r' => '\r',
            'f' => '\x0c',
            't' => '\t',
            'v' => '\x0b',
            'a' => '\x07',
            '^' => match self.read_char(stream)? {
                Some(c) => control_char(c),
                None => {
                    return Ok(Escape {
                        resolved: '^',
                        next: None,
                    });
                }
            },
            '0'..='7' => return self.read_octal_escape(stream, first),
            'x' => return self.read_hex_escape(stream),
            other => other,
        };

        Ok(Escape {
            resolved,
            next: self.read_char(stream)?,
        })
    }

    fn read_octal_escape(&mut self, stream: &Stream, first: char) -> Result<Escape> {
        let mut code = digit_value(first, 8);
        for _ in 0..2 {
            match self.read_char(stream)? {
                Some(c) if c.is_digit(8) => code = code * 8 + digit_value(c, 8),
                next => {
                    return Ok(Escape {
                        resolved: code_to_char(code),
                        next,
                    });
                }
            }
        }

        Ok(Escape {
            resolved: code_to_char(code),
            next: self.read_char(stream)?,
        })
    }

    fn read_hex_escape(&mut self, stream: &Stream) -> Result<Escape> {
        let mut code = 0u32;
        loop {
            match self.read_char(stream)? {
                Some(c) if c.is_ascii_hexdigit() => {
                    code = code.wrapping_mul(16).wrapping_add(digit_value(c, 16));
                }
                next => {
                    return Ok(Escape {
                        resolved: code_to_char(code),
                        next,
                    });
                }
            }
        }
    }
}

fn control_char(c: char) -> char {
    code_to_char(c.to_ascii_uppercase() as u32 ^ 0x40)
}

fn digit_value(c: char, radix: u32) -> u32 {
    c.to_digit(radix).unwrap_or(0)
}

fn code_to_char(code: u32) -> char {
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}
