//! Byte cursor with mark/rewind over an in-memory slice

/// Read position over a borrowed byte slice.
///
/// The scanner uses [`mark`](ByteCursor::mark) and
/// [`rewind`](ByteCursor::rewind) to peek at a candidate block header and
/// back out when it turns out to be the start of a record.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    mark: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `buf`
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            mark: 0,
        }
    }

    /// Current offset into the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True once every byte has been read
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Remember the current position
    pub fn mark(&mut self) {
        self.mark = self.pos;
    }

    /// Return to the last marked position
    pub fn rewind(&mut self) {
        self.pos = self.mark;
    }

    /// Read one byte, or `None` at end of buffer
    pub fn read_u8(&mut self) -> Option<u8> {
        let byte = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    /// Read `len` bytes, or nothing if fewer remain
    pub fn read_slice(&mut self, len: usize) -> Option<&'a [u8]> {
        if len > self.remaining() {
            return None;
        }
        let out = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Some(out)
    }

    /// Bytes between `start` and the current position
    pub fn since(&self, start: usize) -> &'a [u8] {
        &self.buf[start..self.pos]
    }
}
