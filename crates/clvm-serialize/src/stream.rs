use std::io::{self, Read, Write};

use crate::Result;

/// Counts the bytes read through it, so a parser knows the offset of every
/// object it decodes.
pub(crate) struct OffsetReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> OffsetReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl<R: Read> Read for OffsetReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.offset += n as u64;
        Ok(n)
    }
}

pub(crate) struct OffsetWriter<W> {
    inner: W,
    offset: u64,
}

impl<W: Write> OffsetWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, offset: 0 }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl<W: Write> Write for OffsetWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.offset += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Copies every byte read through it into `record`.
pub(crate) struct RecordingReader<'a, R> {
    inner: R,
    record: &'a mut Vec<u8>,
}

impl<'a, R: Read> RecordingReader<'a, R> {
    pub fn new(inner: R, record: &'a mut Vec<u8>) -> Self {
        Self { inner, record }
    }
}

impl<R: Read> Read for RecordingReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.record.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

pub(crate) fn read_u8<R: Read>(f: &mut R) -> Result<u8> {
    let mut buf = [0; 1];
    f.read_exact(&mut buf)?;
    Ok(buf[0])
}
