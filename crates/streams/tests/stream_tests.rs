use rill_streams::{
    BufferRef, LineBuffer, Mark, MarkRef, Position, Stream, StreamRuntime, StreamSettings,
    TextBuffer, Value, make_ptr_mut,
};
use rill_test_utils::{OutputCapture, ProcessCapture, RecordingCallable, StatusCapture};

fn runtime() -> StreamRuntime {
    OutputCapture::make_runtime_with_output_capture("").0
}

fn buffer(text: &str) -> BufferRef {
    make_ptr_mut!(LineBuffer::new("scratch", text))
}

fn mark(buffer: &BufferRef, position: Position) -> MarkRef {
    Mark::new(buffer.clone(), position).into()
}

fn read_all(runtime: &mut StreamRuntime, stream: &Stream) -> String {
    let mut result = String::new();
    while let Some(c) = runtime.read_char(stream).unwrap() {
        result.push(c);
    }
    result
}

mod string_streams {
    use super::*;

    #[test]
    fn output_is_extracted_and_reset() {
        let mut runtime = runtime();
        let output = Stream::string_output();
        runtime.write_str(&output, "hello").unwrap();
        runtime.write_str(&output, " world").unwrap();
        assert_eq!(&*output.take_output().unwrap(), "hello world");
        assert_eq!(&*output.take_output().unwrap(), "");
        runtime.write_char(&output, 'x').unwrap();
        assert_eq!(&*output.take_output().unwrap(), "x");
    }

    #[test]
    fn input_with_pushback() {
        let mut runtime = runtime();
        let input = Stream::string_input("abc", 0);
        assert_eq!(runtime.read_char(&input).unwrap(), Some('a'));
        assert_eq!(runtime.read_char(&input).unwrap(), Some('b'));
        assert!(runtime.unread_char(&input, 'b').unwrap());
        assert_eq!(runtime.read_char(&input).unwrap(), Some('b'));
        assert_eq!(runtime.read_char(&input).unwrap(), Some('c'));
        assert_eq!(runtime.read_char(&input).unwrap(), None);
        assert_eq!(runtime.read_char(&input).unwrap(), None);
    }

    #[test]
    fn clones_share_their_position() {
        let mut runtime = runtime();
        let input = Stream::string_input("xyz", 0);
        let other = input.clone();
        runtime.read_char(&input).unwrap();
        assert_eq!(runtime.read_char(&other).unwrap(), Some('y'));
    }
}

mod round_trips {
    use super::*;

    #[test]
    fn buffer_position() {
        let mut runtime = runtime();
        let buffer = buffer("hello");
        let writer = Stream::buffer_position(buffer.clone(), Position::new(0, 2));
        let reader = Stream::buffer_position(buffer.clone(), Position::new(0, 2));
        runtime.write_char(&writer, 'Z').unwrap();
        assert_eq!(runtime.read_char(&reader).unwrap(), Some('Z'));
        assert_eq!(read_all(&mut runtime, &reader), "llo");
    }

    #[test]
    fn mark() {
        let mut runtime = runtime();
        let buffer = buffer("ab");
        let writer = super::mark(&buffer, Position::new(0, 1));
        let reader = super::mark(&buffer, Position::new(0, 1));
        runtime.write_char(&Stream::Mark(writer.clone()), '+').unwrap();
        assert_eq!(writer.borrow().position, Position::new(0, 2));
        assert_eq!(runtime.read_char(&Stream::Mark(reader)).unwrap(), Some('+'));
    }

    #[test]
    fn buffer_point() {
        let mut runtime = runtime();
        let buffer = buffer("");
        let stream = Stream::Buffer(buffer.clone());
        runtime.write_char(&stream, 'q').unwrap();
        buffer.borrow_mut().set_point(Position::new(0, 0));
        assert_eq!(runtime.read_char(&stream).unwrap(), Some('q'));
    }

    #[test]
    fn string_output_into_string_input() {
        let mut runtime = runtime();
        let output = Stream::string_output();
        runtime.write_char(&output, 'é').unwrap();
        let input = Stream::string_input(output.take_output().unwrap(), 0);
        assert_eq!(runtime.read_char(&input).unwrap(), Some('é'));
    }

    #[test]
    fn buffer_append_then_read_from_the_old_end() {
        let mut runtime = runtime();
        let buffer = buffer("abc");
        let end = buffer.borrow().logical_end();
        runtime
            .write_char(&Stream::buffer_append(buffer.clone()), 'd')
            .unwrap();
        let reader = Stream::buffer_position(buffer, end);
        assert_eq!(runtime.read_char(&reader).unwrap(), Some('d'));
    }
}

mod pushback {
    use super::*;

    fn check_reads_then_unreads(runtime: &mut StreamRuntime, stream: &Stream, n: usize) {
        let mut read = Vec::new();
        for _ in 0..n {
            read.push(runtime.read_char(stream).unwrap().unwrap());
        }
        for c in read.iter().rev() {
            assert!(runtime.unread_char(stream, *c).unwrap());
        }
        let mut reread = Vec::new();
        for _ in 0..n {
            reread.push(runtime.read_char(stream).unwrap().unwrap());
        }
        assert_eq!(read, reread);
    }

    #[test]
    fn string_input() {
        let mut runtime = runtime();
        check_reads_then_unreads(&mut runtime, &Stream::string_input("abcdef", 1), 4);
    }

    #[test]
    fn buffer_across_lines() {
        let mut runtime = runtime();
        let buffer = buffer("ab\ncd\nef");
        buffer.borrow_mut().set_point(Position::new(0, 1));
        let stream = Stream::Buffer(buffer.clone());
        check_reads_then_unreads(&mut runtime, &stream, 5);
        assert_eq!(buffer.borrow().point(), Position::new(2, 0));
    }

    #[test]
    fn mark_and_buffer_position() {
        let mut runtime = runtime();
        let buffer = buffer("one\ntwo");
        let mark = mark(&buffer, Position::new(0, 2));
        check_reads_then_unreads(&mut runtime, &Stream::Mark(mark.clone()), 3);
        assert_eq!(mark.borrow().position, Position::new(1, 1));

        let stream = Stream::buffer_position(buffer, Position::default());
        check_reads_then_unreads(&mut runtime, &stream, 7);
    }

    #[test]
    fn reads_stop_at_the_restriction() {
        let mut runtime = runtime();
        let mut text_buffer = LineBuffer::new("restricted", "a\nb\nc");
        text_buffer.restrict(1, 2).unwrap();
        let buffer: BufferRef = make_ptr_mut!(text_buffer);
        let stream = Stream::buffer_position(buffer, Position::new(1, 0));
        assert_eq!(read_all(&mut runtime, &stream), "b");
        assert!(runtime.unread_char(&stream, 'b').unwrap());
        assert!(!runtime.unread_char(&stream, 'a').unwrap());
        assert_eq!(runtime.read_char(&stream).unwrap(), Some('b'));
    }
}

mod buffers {
    use super::*;
    use rill_streams::ErrorKind;

    #[test]
    fn read_only_buffers_reject_writes() {
        let mut runtime = runtime();
        let mut text_buffer = LineBuffer::new("locked", "abc");
        text_buffer.set_read_only(true);
        let buffer: BufferRef = make_ptr_mut!(text_buffer);
        let error = runtime
            .write_str(&Stream::Buffer(buffer.clone()), "x")
            .unwrap_err();
        assert!(matches!(error.error, ErrorKind::BufferReadOnly { .. }));
        assert_eq!(runtime.read_char(&Stream::Buffer(buffer)).unwrap(), Some('a'));
    }

    #[test]
    fn buffer_append_sees_other_edits() {
        let mut runtime = runtime();
        let buffer = buffer("x");
        let append = Stream::buffer_append(buffer.clone());
        runtime.write_str(&append, "1").unwrap();
        buffer
            .borrow_mut()
            .insert(Position::new(0, 2), "\nother")
            .unwrap();
        runtime.write_str(&append, "2").unwrap();

        let mut all = String::new();
        let reader = Stream::buffer_position(buffer, Position::default());
        while let Some(c) = runtime.read_char(&reader).unwrap() {
            all.push(c);
        }
        assert_eq!(all, "x1\nother2");
    }

    #[test]
    fn non_resident_marks_are_rejected() {
        let mut runtime = runtime();
        let buffer = buffer("abc");
        let mark = mark(&buffer, Position::default());
        mark.borrow_mut().detach();
        let error = runtime.read_char(&Stream::Mark(mark)).unwrap_err();
        assert!(matches!(error.error, ErrorKind::InvalidStream { .. }));
    }
}

mod callables {
    use super::*;

    #[test]
    fn a_callable_source_supports_pushback() {
        let mut runtime = runtime();
        let recorder = RecordingCallable::default();
        let stream = Stream::Callable(recorder.source("hi"));
        assert_eq!(runtime.read_char(&stream).unwrap(), Some('h'));
        assert!(runtime.unread_char(&stream, 'h').unwrap());
        assert_eq!(read_all(&mut runtime, &stream), "hi");
        assert_eq!(
            recorder.calls()[1],
            vec![Value::from('h')],
            "push-back should pass the character"
        );
    }

    #[test]
    fn block_writes_pass_a_string() {
        let mut runtime = runtime();
        let recorder = RecordingCallable::default();
        let stream = Stream::Callable(recorder.callable(|_| Value::True));
        assert_eq!(runtime.write_str(&stream, "abc").unwrap(), 3);
        assert_eq!(runtime.write_char(&stream, 'd').unwrap(), 1);
        assert_eq!(
            recorder.calls(),
            vec![vec![Value::from("abc")], vec![Value::from('d')]]
        );
    }

    #[test]
    fn callables_can_reenter_the_runtime() {
        let mut runtime = runtime();
        let inner = Stream::string_output();
        let captured = inner.clone();
        let stream = Stream::Callable(rill_streams::Callable::new(move |ctx| {
            assert!(ctx.runtime.is_collection_deferred());
            let written = match ctx.args() {
                [Value::Str(s)] => ctx.runtime.write_str(&captured, &s.to_uppercase())?,
                _ => 0,
            };
            Ok(Value::from(written))
        }));

        assert!(!runtime.is_collection_deferred());
        runtime.write_str(&stream, "shout").unwrap();
        assert!(!runtime.is_collection_deferred());
        assert_eq!(&*inner.take_output().unwrap(), "SHOUT");
    }

    #[test]
    fn errors_from_callables_propagate() {
        let mut runtime = runtime();
        let stream = Stream::Callable(rill_streams::Callable::new(|_| {
            rill_streams::runtime_error!("callable failed")
        }));
        let error = runtime.read_char(&stream).unwrap_err();
        assert_eq!(error.to_string(), "callable failed");
        assert!(!runtime.is_collection_deferred());
    }
}

mod write_only_streams {
    use super::*;

    fn runtime_with_status(status: &StatusCapture) -> StreamRuntime {
        StreamRuntime::with_settings(StreamSettings {
            stdin: Box::new(OutputCapture::default()),
            stdout: Box::new(OutputCapture::default()),
            stderr: Box::new(OutputCapture::default()),
            status_line: status.status_line(),
            ..Default::default()
        })
    }

    #[test]
    fn status_line_messages_are_started_then_extended() {
        let status = StatusCapture::default();
        let mut runtime = runtime_with_status(&status);
        runtime.write_str(&Stream::StatusLine, "Saving").unwrap();
        runtime.write_str(&Stream::StatusLine, "...").unwrap();
        assert_eq!(status.messages(), vec!["Saving..."]);
        assert_eq!(status.redraw_count(), 2);

        status.dismiss();
        runtime.write_char(&Stream::StatusLine, '!').unwrap();
        assert_eq!(status.messages(), vec!["Saving...", "!"]);
        assert!(!runtime.unread_char(&Stream::StatusLine, '!').unwrap());
    }

    #[test]
    fn status_line_is_write_only() {
        let status = StatusCapture::default();
        let mut runtime = runtime_with_status(&status);
        assert!(runtime.read_char(&Stream::StatusLine).is_err());
    }

    #[test]
    fn process_writes() {
        let mut runtime = runtime();
        let process = ProcessCapture::new("cat");
        let stream = Stream::Process(process.process());
        assert_eq!(runtime.write_str(&stream, "input\n").unwrap(), 6);
        assert!(runtime.read_char(&stream).is_err());

        process.exit();
        assert_eq!(runtime.write_str(&stream, "dropped").unwrap(), 0);
        assert_eq!(process.captured_input(), "input\n");
    }

    #[test]
    fn processes_print_their_name() {
        let process = ProcessCapture::new("cat");
        assert_eq!(
            Value::Process(process.process()).display_string(),
            "#<process cat>"
        );
    }
}

mod default_stream {
    use super::*;

    #[test]
    fn reads_and_writes_use_the_standard_files() {
        let (mut runtime, output) = OutputCapture::make_runtime_with_output_capture("in\n");
        assert_eq!(runtime.read_line(&Stream::Default).unwrap().as_deref(), Some("in\n"));
        runtime.write_str(&Stream::Default, "out").unwrap();
        runtime.files().stdout().flush().unwrap();
        assert_eq!(output.captured_output(), "out");
    }

    #[test]
    fn rebinding_standard_output() {
        let (mut runtime, output) = OutputCapture::make_runtime_with_output_capture("");
        let redirected = Stream::string_output();
        runtime.with_standard_output(redirected.clone(), |runtime| {
            runtime.princ(&Stream::Default, &Value::from("inner")).unwrap();
        });
        runtime.princ(&Stream::Default, &Value::from("outer")).unwrap();
        runtime.files().stdout().flush().unwrap();

        assert_eq!(&*redirected.take_output().unwrap(), "inner");
        assert_eq!(output.captured_output(), "outer");
    }
}
