use std::io::{self, Read};

/// Pads reads past the end of its buffer with spaces, forever.
pub(crate) struct InfiniteStream {
    buf: Vec<u8>,
    pos: usize,
}

impl InfiniteStream {
    pub(crate) fn new(buf: &[u8]) -> Self {
        Self {
            buf: buf.to_vec(),
            pos: 0,
        }
    }

    /// The number of bytes handed out so far.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }
}

impl Read for InfiniteStream {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        for b in out.iter_mut() {
            *b = self.buf.get(self.pos).copied().unwrap_or(b' ');
            self.pos += 1;
        }
        Ok(out.len())
    }
}
