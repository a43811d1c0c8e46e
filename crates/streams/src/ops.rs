//! Operations built on the character-level primitives

use crate::{
    DisplayContext, File, Result, Stream, StreamRuntime, Value,
    error::{argument_error, missing_argument},
};
use regex::RegexBuilder;

impl StreamRuntime {
    /// Reads the next line from a stream, including its newline if one was found
    ///
    /// At most `line_limit` bytes are read from files, and `line_limit` characters from other
    /// streams. Returns `None` if nothing could be read.
    pub fn read_line(&mut self, stream: &Stream) -> Result<Option<String>> {
        match stream {
            Stream::Default => match self.standard_input() {
                Some(Stream::Default) | None => Ok(None),
                Some(resolved) => self.read_line(&resolved),
            },
            Stream::File(file) => file.read_line(self.line_limit),
            _ => {
                let mut line = String::new();
                let mut count = 0;
                while count < self.line_limit {
                    self.check_interrupt()?;
                    match self.read_char(stream)? {
                        Some(c) => {
                            line.push(c);
                            count += 1;
                            if c == '\n' {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                Ok((!line.is_empty()).then_some(line))
            }
        }
    }

    /// Copies characters from `source` to `destination` until the source is exhausted
    ///
    /// Returns the number of characters copied, or `None` if there was nothing to copy.
    /// The interrupt flag is polled before each block.
    pub fn copy_stream(&mut self, source: &Stream, destination: &Stream) -> Result<Option<usize>> {
        let mut block = String::with_capacity(self.copy_block_size);
        let mut total = 0;

        loop {
            block.clear();
            let mut count = 0;
            let mut exhausted = false;
            while count < self.copy_block_size {
                self.check_interrupt()?;
                match self.read_char(source)? {
                    Some(c) => {
                        block.push(c);
                        count += 1;
                    }
                    None => {
                        exhausted = true;
                        break;
                    }
                }
            }

            if count > 0 {
                self.write_str(destination, &block)?;
                total += count;
            }
            if exhausted {
                break;
            }
        }

        Ok((total > 0).then_some(total))
    }

    /// Writes a character or a string to a stream
    ///
    /// `data` is either an integer character code or a string. For strings, `length` limits
    /// the output to the first `length` characters. Returns the number of characters written.
    pub fn write_value(
        &mut self,
        stream: &Stream,
        data: &Value,
        length: Option<&Value>,
    ) -> Result<usize> {
        match data {
            Value::Int(_) => match data.as_char() {
                Some(c) => self.write_char(stream, c),
                None => argument_error(data, 2),
            },
            Value::Str(s) => {
                let s: &str = s;
                let text = match length {
                    None | Some(Value::Nil) => s,
                    Some(length_value @ Value::Int(n)) => {
                        let end = usize::try_from(*n)
                            .ok()
                            .and_then(|n| prefix_end(s, n));
                        match end {
                            Some(end) => &s[..end],
                            None => return argument_error(length_value, 3),
                        }
                    }
                    Some(other) => return argument_error(other, 3),
                };
                self.write_str(stream, text)
            }
            _ => argument_error(data, 2),
        }
    }

    /// Writes the value's readable form to the stream, preceded by a newline
    pub fn print(&mut self, stream: &Stream, value: &Value) -> Result<()> {
        self.write_char(stream, '\n')?;
        self.write_display(stream, value, true)?;
        Ok(())
    }

    /// Writes the value's readable form to the stream
    pub fn prin1(&mut self, stream: &Stream, value: &Value) -> Result<()> {
        self.write_display(stream, value, true)?;
        Ok(())
    }

    /// Writes the value's plain form to the stream
    pub fn princ(&mut self, stream: &Stream, value: &Value) -> Result<()> {
        self.write_display(stream, value, false)?;
        Ok(())
    }

    fn write_display(&mut self, stream: &Stream, value: &Value, quoted: bool) -> Result<usize> {
        let mut ctx = if quoted {
            DisplayContext::quoted()
        } else {
            DisplayContext::plain()
        };
        value.display(&mut ctx);
        self.write_str(stream, &ctx.result())
    }

    /// Writes a template to a stream, substituting `%` directives with the arguments in turn
    ///
    /// | Directive | Output                                  |
    /// |-----------|-----------------------------------------|
    /// | `%d`      | an integer in decimal                   |
    /// | `%x`      | an integer in hexadecimal               |
    /// | `%o`      | an integer in octal                     |
    /// | `%c`      | an integer as a character               |
    /// | `%s`      | any value in its plain form             |
    /// | `%S`      | any value in its readable form          |
    /// | `%%`      | a literal `%`, consuming no argument    |
    ///
    /// Unknown directives consume an argument and produce no output. A `%` at the end of the
    /// template is written as-is.
    ///
    /// With no destination, the output is collected and returned as a string, otherwise the
    /// destination is returned. Argument indices in errors count the destination and the
    /// template, so the first substituted argument is number 3.
    pub fn format(
        &mut self,
        destination: Option<&Stream>,
        template: &str,
        args: &[Value],
    ) -> Result<Value> {
        let output = match destination {
            Some(stream) => stream.clone(),
            None => Stream::string_output(),
        };

        let mut literal = String::new();
        let mut next_arg = 0;
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }

            let directive = match chars.next() {
                Some('%') | None => {
                    literal.push('%');
                    continue;
                }
                Some(directive) => directive,
            };

            if !literal.is_empty() {
                self.write_str(&output, &literal)?;
                literal.clear();
            }

            let index = next_arg + 3;
            let Some(arg) = args.get(next_arg) else {
                return missing_argument(index);
            };
            next_arg += 1;

            match directive {
                'd' | 'x' | 'o' => {
                    let Value::Int(n) = arg else {
                        return argument_error(arg, index);
                    };
                    let text = match directive {
                        'd' => n.to_string(),
                        'x' => format!("{n:x}"),
                        _ => format!("{n:o}"),
                    };
                    self.write_str(&output, &text)?;
                }
                'c' => match arg.as_char() {
                    Some(c) => {
                        self.write_char(&output, c)?;
                    }
                    None => return argument_error(arg, index),
                },
                's' => {
                    self.write_display(&output, arg, false)?;
                }
                'S' => {
                    self.write_display(&output, arg, true)?;
                }
                _ => {}
            }
        }

        if !literal.is_empty() {
            self.write_str(&output, &literal)?;
        }

        match destination {
            Some(stream) => Ok(stream.clone().into()),
            None => output.take_output().map(Value::Str),
        }
    }

    /// Reads lines from a file until one matches the pattern, returning the matching line
    ///
    /// Returns `None` if the end of the file is reached first. The file must be bound.
    pub fn read_file_until(
        &mut self,
        file: &File,
        pattern: &str,
        ignore_case: bool,
    ) -> Result<Option<String>> {
        if !file.is_bound() {
            return argument_error(&Value::File(file.clone()), 1);
        }
        let Ok(regex) = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
        else {
            return argument_error(&Value::from(pattern), 2);
        };

        loop {
            self.check_interrupt()?;
            match file.read_line(self.line_limit)? {
                Some(line) if regex.is_match(&line) => return Ok(Some(line)),
                Some(_) => {}
                None => return Ok(None),
            }
        }
    }
}

// The byte offset of the end of the first `count` characters
fn prefix_end(s: &str, count: usize) -> Option<usize> {
    if count == 0 {
        return Some(0);
    }
    s.char_indices()
        .nth(count - 1)
        .map(|(offset, c)| offset + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, StreamSettings};
    use std::io;

    fn runtime() -> StreamRuntime {
        StreamRuntime::with_settings(StreamSettings {
            stdin: Box::new(io::empty()),
            stdout: Box::new(io::empty()),
            stderr: Box::new(io::empty()),
            line_limit: 8,
            copy_block_size: 3,
            ..Default::default()
        })
    }

    fn format(template: &str, args: &[Value]) -> Result<String> {
        let result = runtime().format(None, template, args)?;
        Ok(result.display_string().trim_matches('"').to_string())
    }

    #[test]
    fn read_line_from_a_string() {
        let mut runtime = runtime();
        let stream = Stream::string_input("ab\ncdefghijk", 0);
        assert_eq!(runtime.read_line(&stream).unwrap().as_deref(), Some("ab\n"));
        assert_eq!(runtime.read_line(&stream).unwrap().as_deref(), Some("cdefghij"));
        assert_eq!(runtime.read_line(&stream).unwrap().as_deref(), Some("k"));
        assert_eq!(runtime.read_line(&stream).unwrap(), None);
    }

    #[test]
    fn copy_across_several_blocks() {
        let mut runtime = runtime();
        let source = Stream::string_input("abcdefg", 0);
        let destination = Stream::string_output();
        assert_eq!(runtime.copy_stream(&source, &destination).unwrap(), Some(7));
        assert_eq!(&*destination.take_output().unwrap(), "abcdefg");
        assert_eq!(runtime.copy_stream(&source, &destination).unwrap(), None);
    }

    #[test]
    fn copy_stops_when_interrupted() {
        let mut runtime = runtime();
        runtime.interrupt_flag().request();
        let result = runtime.copy_stream(&Stream::string_input("abc", 0), &Stream::string_output());
        assert!(result.unwrap_err().is_interrupt());
    }

    #[test]
    fn interrupts_are_observed_within_a_block() {
        use crate::Callable;
        use std::sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        };

        let mut runtime = runtime();
        let interrupt = runtime.interrupt_flag().clone();
        let reads = Arc::new(AtomicUsize::new(0));
        let counter = reads.clone();
        let source = Stream::Callable(Callable::new(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 2 {
                interrupt.request();
            }
            Ok(Value::Int('x' as i64))
        }));

        let result = runtime.copy_stream(&source, &Stream::string_output());
        assert!(result.unwrap_err().is_interrupt());
        assert_eq!(reads.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn write_with_a_length() {
        let mut runtime = runtime();
        let output = Stream::string_output();
        let data = Value::from("héllo");
        assert_eq!(runtime.write_value(&output, &data, Some(&Value::Int(2))).unwrap(), 2);
        assert_eq!(runtime.write_value(&output, &Value::from('!'), None).unwrap(), 1);
        assert_eq!(&*output.take_output().unwrap(), "hé!");

        match runtime.write_value(&output, &data, Some(&Value::Int(6))).unwrap_err().error {
            ErrorKind::ArgumentError { index, .. } => assert_eq!(index, 3),
            other => panic!("unexpected error: {other}"),
        }
        match runtime.write_value(&output, &Value::True, None).unwrap_err().error {
            ErrorKind::ArgumentError { index, .. } => assert_eq!(index, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn format_directives() {
        let args = [
            Value::Int(42),
            Value::Int(255),
            Value::Int(8),
            Value::from('z'),
            Value::from("plain"),
        ];
        assert_eq!(
            format("%d %x %o %c %s 100%%", &args).unwrap(),
            "42 ff 10 z plain 100%"
        );
    }

    #[test]
    fn format_quoted_strings() {
        let mut runtime = runtime();
        let result = runtime
            .format(None, "<%S>", &[Value::from("a\"b")])
            .unwrap();
        assert_eq!(result, Value::from("<\"a\\\"b\">"));
    }

    #[test]
    fn format_edge_cases() {
        assert_eq!(format("50%", &[]).unwrap(), "50%");
        assert_eq!(format("[%q]", &[Value::Int(1)]).unwrap(), "[]");
        assert!(matches!(
            format("%d", &[]).unwrap_err().error,
            ErrorKind::MissingArgument { index: 3 }
        ));
        assert!(matches!(
            format("%s %d", &[Value::Nil, Value::from("x")]).unwrap_err().error,
            ErrorKind::ArgumentError { index: 4, .. }
        ));
    }

    #[test]
    fn format_to_a_stream_returns_the_stream() {
        let mut runtime = runtime();
        let output = Stream::string_output();
        let result = runtime.format(Some(&output), "%d", &[Value::Int(1)]).unwrap();
        assert_eq!(result, Value::Stream(output.clone()));
        assert_eq!(&*output.take_output().unwrap(), "1");
    }

    #[test]
    fn print_forms() {
        let mut runtime = runtime();
        let output = Stream::string_output();
        let value = Value::from("x");
        runtime.print(&output, &value).unwrap();
        runtime.prin1(&output, &value).unwrap();
        runtime.princ(&output, &value).unwrap();
        assert_eq!(&*output.take_output().unwrap(), "\n\"x\"\"x\"x");
    }

    #[test]
    fn prefix_ends() {
        assert_eq!(prefix_end("aé", 0), Some(0));
        assert_eq!(prefix_end("aé", 2), Some(3));
        assert_eq!(prefix_end("aé", 3), None);
    }
}
