use crate::{RillSend, RillSync};
use std::io;

fn unsupported<T>() -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "unsupported for this file type",
    ))
}

/// The host-level file primitive that a [File](crate::File) object is bound to
///
/// Implementations only need to provide the operations they support, the remaining operations
/// report an `Unsupported` error.
pub trait FileHandle: RillSend + RillSync {
    /// Reads the next byte, returning `None` at the end of the file
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        unsupported()
    }

    /// Appends the next line to `line`, including its newline if one is found within `limit`
    /// bytes
    ///
    /// Returns the number of bytes read, zero at the end of the file.
    fn read_line(&mut self, limit: usize, line: &mut Vec<u8>) -> io::Result<usize> {
        let start = line.len();
        while line.len() - start < limit {
            match self.read_byte()? {
                Some(byte) => {
                    line.push(byte);
                    if byte == b'\n' {
                        break;
                    }
                }
                None => break,
            }
        }
        Ok(line.len() - start)
    }

    /// Writes bytes to the file, returning the number of bytes written
    fn write(&mut self, _bytes: &[u8]) -> io::Result<usize> {
        unsupported()
    }

    /// Writes all of the provided bytes
    fn write_all(&mut self, mut bytes: &[u8]) -> io::Result<()> {
        while !bytes.is_empty() {
            match self.write(bytes)? {
                0 => return Err(io::ErrorKind::WriteZero.into()),
                written => bytes = &bytes[written..],
            }
        }
        Ok(())
    }

    /// Flushes any remaining buffered output
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Releases the handle, flushing any buffered output
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl FileHandle for io::Empty {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(None)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        Ok(bytes.len())
    }
}
