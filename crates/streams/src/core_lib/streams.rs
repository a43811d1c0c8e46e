//! The `streams` library module

use super::Module;
use crate::{
    Result, Stream, StreamRuntime, Value,
    error::{argument_error, unexpected_args},
    is_stream,
};

/// The initializer for the streams module
pub fn make_module() -> Module {
    use Value::{File, Int, Nil, Str};

    let mut result = Module::new("streams");

    result.add_fn("read-char", |ctx| match ctx.args() {
        [] => read_char(ctx.runtime, &Nil),
        [stream] => read_char(ctx.runtime, stream),
        unexpected => unexpected_args("|Stream|", unexpected),
    });

    result.add_fn("read-line", |ctx| match ctx.args() {
        [] => read_line(ctx.runtime, &Nil),
        [stream] => read_line(ctx.runtime, stream),
        unexpected => unexpected_args("|Stream|", unexpected),
    });

    result.add_fn("copy-stream", |ctx| match ctx.args() {
        [source, destination] => {
            let source = Stream::from_value(source)?;
            let destination = Stream::from_value(destination)?;
            let count = ctx.runtime.copy_stream(&source, &destination)?;
            Ok(count.into())
        }
        unexpected => unexpected_args("|Stream, Stream|", unexpected),
    });

    result.add_fn("write", |ctx| {
        let (stream, data, length) = match ctx.args() {
            [stream, data] => (stream, data, None),
            [stream, data, length] => (stream, data, Some(length)),
            unexpected => return unexpected_args("|Stream, Int|String, Int?|", unexpected),
        };
        let stream = Stream::from_value(stream)?;
        let written = ctx.runtime.write_value(&stream, data, length)?;
        Ok(written.into())
    });

    result.add_fn("format", |ctx| match ctx.args() {
        [Nil, Str(template), args @ ..] => ctx.runtime.format(None, template, args),
        [stream, Str(template), args @ ..] => {
            let stream = Stream::from_value(stream)?;
            ctx.runtime.format(Some(&stream), template, args)
        }
        [_, template, ..] => argument_error(template, 2),
        unexpected => unexpected_args("|Stream, String, Any...|", unexpected),
    });

    result.add_fn("print", |ctx| match ctx.args() {
        [value] => print_with(ctx.runtime, value, &Nil, StreamRuntime::print),
        [value, stream] => print_with(ctx.runtime, value, stream, StreamRuntime::print),
        unexpected => unexpected_args("|Any, Stream?|", unexpected),
    });

    result.add_fn("prin1", |ctx| match ctx.args() {
        [value] => print_with(ctx.runtime, value, &Nil, StreamRuntime::prin1),
        [value, stream] => print_with(ctx.runtime, value, stream, StreamRuntime::prin1),
        unexpected => unexpected_args("|Any, Stream?|", unexpected),
    });

    result.add_fn("princ", |ctx| match ctx.args() {
        [value] => print_with(ctx.runtime, value, &Nil, StreamRuntime::princ),
        [value, stream] => print_with(ctx.runtime, value, stream, StreamRuntime::princ),
        unexpected => unexpected_args("|Any, Stream?|", unexpected),
    });

    result.add_fn("make-string-input-stream", |ctx| match ctx.args() {
        [Str(s)] | [Str(s), Nil] => Ok(Stream::string_input(s.clone(), 0).into()),
        [Str(s), start @ Int(n)] => match usize::try_from(*n) {
            Ok(start) => Ok(Stream::string_input(s.clone(), start).into()),
            Err(_) => argument_error(start, 2),
        },
        [Str(_), start] => argument_error(start, 2),
        [other, ..] => argument_error(other, 1),
        unexpected => unexpected_args("|String, Int?|", unexpected),
    });

    result.add_fn("make-string-output-stream", |ctx| match ctx.args() {
        [] => Ok(Stream::string_output().into()),
        unexpected => unexpected_args("||", unexpected),
    });

    result.add_fn("get-output-stream-string", |ctx| match ctx.args() {
        [Value::Stream(stream)] => stream.take_output().map(Str),
        [other] => argument_error(other, 1),
        unexpected => unexpected_args("|Stream|", unexpected),
    });

    result.add_fn("streamp", |ctx| match ctx.args() {
        [value] => Ok(is_stream(value).into()),
        unexpected => unexpected_args("|Any|", unexpected),
    });

    // A host file is only opened when both the name and the mode are given
    result.add_fn("open", |ctx| match ctx.args() {
        [Str(name), Str(mode)] | [Str(name), Str(mode), Nil] => {
            Ok(ctx.runtime.files().open(name, mode, None)?.into())
        }
        [Str(name), Str(mode), File(file)] => {
            Ok(ctx.runtime.files().open(name, mode, Some(file))?.into())
        }
        []
        | [Nil | Str(_)]
        | [Nil | Str(_), Nil | Str(_)]
        | [Nil | Str(_), Nil | Str(_), Nil] => Ok(ctx.runtime.files().make_file().into()),
        [Nil | Str(_), Nil | Str(_), file_value @ File(file)] => {
            file.close()?;
            Ok(file_value.clone())
        }
        [Nil | Str(_), Nil | Str(_), other] => argument_error(other, 3),
        [Nil | Str(_), other] | [Nil | Str(_), other, _] => argument_error(other, 2),
        [other] | [other, _] | [other, _, _] => argument_error(other, 1),
        unexpected => unexpected_args("|String?, String?, File?|", unexpected),
    });

    result.add_fn("close", |ctx| match ctx.args() {
        [file_value @ File(file)] => {
            file.close()?;
            Ok(file_value.clone())
        }
        [other] => argument_error(other, 1),
        unexpected => unexpected_args("|File|", unexpected),
    });

    result.add_fn("flush-file", |ctx| match ctx.args() {
        [file_value @ File(file)] => {
            file.flush()?;
            Ok(file_value.clone())
        }
        [other] => argument_error(other, 1),
        unexpected => unexpected_args("|File|", unexpected),
    });

    result.add_fn("filep", |ctx| match ctx.args() {
        [value] => Ok(matches!(value, File(_)).into()),
        unexpected => unexpected_args("|Any|", unexpected),
    });

    result.add_fn("file-bound-p", |ctx| match ctx.args() {
        [File(file)] => Ok(file.is_bound().into()),
        [other] => argument_error(other, 1),
        unexpected => unexpected_args("|File|", unexpected),
    });

    result.add_fn("file-binding", |ctx| match ctx.args() {
        [File(file)] => Ok(file.name().into()),
        [other] => argument_error(other, 1),
        unexpected => unexpected_args("|File|", unexpected),
    });

    result.add_fn("file-eof-p", |ctx| match ctx.args() {
        [File(file)] => Ok(file.at_eof().into()),
        [other] => argument_error(other, 1),
        unexpected => unexpected_args("|File|", unexpected),
    });

    result.add_fn("read-file-until", |ctx| {
        let (file, pattern, ignore_case) = match ctx.args() {
            [File(file), Str(pattern)] => (file, pattern, false),
            [File(file), Str(pattern), ignore_case] => (file, pattern, !ignore_case.is_nil()),
            [File(_), other, ..] => return argument_error(other, 2),
            [other, ..] => return argument_error(other, 1),
            unexpected => return unexpected_args("|File, String, Any?|", unexpected),
        };
        let line = ctx.runtime.read_file_until(file, pattern, ignore_case)?;
        Ok(line.into())
    });

    result.add_fn("stdin-file", |ctx| match ctx.args() {
        [] => Ok(ctx.runtime.files().stdin().into()),
        unexpected => unexpected_args("||", unexpected),
    });

    result.add_fn("stdout-file", |ctx| match ctx.args() {
        [] => Ok(ctx.runtime.files().stdout().into()),
        unexpected => unexpected_args("||", unexpected),
    });

    result.add_fn("stderr-file", |ctx| match ctx.args() {
        [] => Ok(ctx.runtime.files().stderr().into()),
        unexpected => unexpected_args("||", unexpected),
    });

    result
}

fn read_char(runtime: &mut StreamRuntime, stream: &Value) -> Result<Value> {
    let stream = Stream::from_value(stream)?;
    Ok(runtime.read_char(&stream)?.into())
}

fn read_line(runtime: &mut StreamRuntime, stream: &Value) -> Result<Value> {
    let stream = Stream::from_value(stream)?;
    Ok(runtime.read_line(&stream)?.into())
}

fn print_with(
    runtime: &mut StreamRuntime,
    value: &Value,
    stream: &Value,
    print: fn(&mut StreamRuntime, &Stream, &Value) -> Result<()>,
) -> Result<Value> {
    let stream = Stream::from_value(stream)?;
    print(runtime, &stream, value)?;
    Ok(value.clone())
}
