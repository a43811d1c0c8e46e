use crate::FileHandle;
use std::io::{self, BufRead, Read, Write};

fn unavailable<T>(name: &str) -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("{name} is unavailable"),
    ))
}

macro_rules! stream {
    (
        name: $name:literal,
        system: $system:ident,
        unavailable: $unavailable:ident,
    ) => {
        #[doc = concat!("The process's ", $name)]
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $system;

        #[doc = concat!("Represents an unavailable ", $name, " stream")]
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $unavailable;

        impl FileHandle for $unavailable {
            fn read_byte(&mut self) -> io::Result<Option<u8>> {
                unavailable($name)
            }

            fn read_line(&mut self, _limit: usize, _line: &mut Vec<u8>) -> io::Result<usize> {
                unavailable($name)
            }

            fn write(&mut self, _bytes: &[u8]) -> io::Result<usize> {
                unavailable($name)
            }

            fn flush(&mut self) -> io::Result<()> {
                unavailable($name)
            }

            fn close(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
    };
}

stream! {
    name: "stdin",
    system: SystemStdin,
    unavailable: UnavailableStdin,
}

stream! {
    name: "stdout",
    system: SystemStdout,
    unavailable: UnavailableStdout,
}

stream! {
    name: "stderr",
    system: SystemStderr,
    unavailable: UnavailableStderr,
}

/// The stdin handle used when none is provided in the runtime's settings
#[cfg(not(target_arch = "wasm32"))]
pub type DefaultStdin = SystemStdin;
/// The stdout handle used when none is provided in the runtime's settings
#[cfg(not(target_arch = "wasm32"))]
pub type DefaultStdout = SystemStdout;
/// The stderr handle used when none is provided in the runtime's settings
#[cfg(not(target_arch = "wasm32"))]
pub type DefaultStderr = SystemStderr;

/// The stdin handle used when none is provided in the runtime's settings
#[cfg(target_arch = "wasm32")]
pub type DefaultStdin = UnavailableStdin;
/// The stdout handle used when none is provided in the runtime's settings
#[cfg(target_arch = "wasm32")]
pub type DefaultStdout = UnavailableStdout;
/// The stderr handle used when none is provided in the runtime's settings
#[cfg(target_arch = "wasm32")]
pub type DefaultStderr = UnavailableStderr;

impl FileHandle for SystemStdin {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut handle = io::stdin().lock();
        let byte = handle.fill_buf()?.first().copied();
        if byte.is_some() {
            handle.consume(1);
        }
        Ok(byte)
    }

    fn read_line(&mut self, limit: usize, line: &mut Vec<u8>) -> io::Result<usize> {
        io::stdin()
            .lock()
            .take(limit as u64)
            .read_until(b'\n', line)
    }
}

impl FileHandle for SystemStdout {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        io::stdout().write(bytes)
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        io::stdout().lock().write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

impl FileHandle for SystemStderr {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        io::stderr().write(bytes)
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        io::stderr().lock().write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
