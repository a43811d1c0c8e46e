use crate::{FileHandle, RillSend, RillSync};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Result, Seek, SeekFrom, Write};

/// A combination of BufReader and BufWriter
///
/// Used as the handle for files opened by the registry, so that reading one character at a
/// time doesn't result in a system call per character.
#[derive(Debug)]
pub struct BufferedFile<T: Write>(Reader<T>);

type Reader<T> = BufReader<BufWriterWrapper<T>>;
type Writer<T> = BufWriter<T>;

impl<T> BufferedFile<T>
where
    T: Read + Write,
{
    /// Creates a BufferedFile that wraps the provided Read + Write value
    pub fn new(file: T) -> Self {
        Self(BufReader::new(BufWriterWrapper::new(file)))
    }

    fn reader(&mut self) -> &mut Reader<T> {
        &mut self.0
    }

    fn writer(&mut self) -> &mut Writer<T> {
        self.reader().get_mut().writer()
    }
}

impl<T> Seek for BufferedFile<T>
where
    T: Read + Write + Seek,
{
    fn seek(&mut self, position: SeekFrom) -> Result<u64> {
        self.reader().seek(position)
    }
}

impl<T> Read for BufferedFile<T>
where
    T: Read + Write,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.reader().read(buf)
    }
}

impl<T> BufRead for BufferedFile<T>
where
    T: Read + Write,
{
    fn fill_buf(&mut self) -> Result<&[u8]> {
        self.reader().fill_buf()
    }

    fn consume(&mut self, amount: usize) {
        self.reader().consume(amount)
    }
}

impl<T> Write for BufferedFile<T>
where
    T: Read + Write,
{
    fn write(&mut self, buffer: &[u8]) -> Result<usize> {
        self.writer().write(buffer)
    }

    fn flush(&mut self) -> Result<()> {
        self.writer().flush()
    }
}

impl<T> FileHandle for BufferedFile<T>
where
    T: Read + Write + RillSend + RillSync,
{
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let byte = self.fill_buf()?.first().copied();
        if byte.is_some() {
            self.consume(1);
        }
        Ok(byte)
    }

    fn read_line(&mut self, limit: usize, line: &mut Vec<u8>) -> Result<usize> {
        (&mut *self).take(limit as u64).read_until(b'\n', line)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        Write::write(self, bytes)
    }

    fn flush(&mut self) -> Result<()> {
        Write::flush(self)
    }
}

#[derive(Debug)]
struct BufWriterWrapper<T>(Writer<T>)
where
    T: Write;

impl<T> BufWriterWrapper<T>
where
    T: Write,
{
    fn new(file: T) -> Self {
        Self(BufWriter::new(file))
    }

    fn writer(&mut self) -> &mut Writer<T> {
        &mut self.0
    }
}

impl<T> Seek for BufWriterWrapper<T>
where
    T: Seek + Write,
{
    fn seek(&mut self, position: SeekFrom) -> Result<u64> {
        self.writer().seek(position)
    }
}

impl<T> Read for BufWriterWrapper<T>
where
    T: Read + Write,
{
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.writer().get_mut().read(buffer)
    }
}
