use std::io::{ErrorKind, Read, Write};

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::{ByteSink, ByteSource};

const READ_CHUNK_SIZE: usize = 512;

/// Adapts any `Read + Write` stream to [`ByteSource`] and [`ByteSink`].
///
/// Reads are chunked into an internal buffer so that the per-byte interface
/// does not turn into one syscall per byte. A read that times out or would
/// block means "nothing available"; a zero-length read marks the stream as
/// closed and every later `bytes_available` returns `false`.
pub struct StreamLink<T> {
    inner: T,
    buf: [u8; READ_CHUNK_SIZE],
    pos: usize,
    filled: usize,
    closed: bool,
}

impl<T> StreamLink<T> {
    /// Wrap a stream.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: [0u8; READ_CHUNK_SIZE],
            pos: 0,
            filled: 0,
            closed: false,
        }
    }

    /// Number of bytes already pulled from the stream but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.filled - self.pos
    }

    /// Drop any buffered, unconsumed input.
    pub fn discard_buffered(&mut self) {
        self.pos = 0;
        self.filled = 0;
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the adapter and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read> StreamLink<T> {
    fn fill(&mut self) -> Result<()> {
        loop {
            match self.inner.read(&mut self.buf) {
                Ok(0) => {
                    debug!("transport stream reached EOF");
                    self.closed = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.pos = 0;
                    self.filled = n;
                    return Ok(());
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    return Ok(())
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl<T: Read> ByteSource for StreamLink<T> {
    fn bytes_available(&mut self) -> Result<bool> {
        if self.pos < self.filled {
            return Ok(true);
        }
        if self.closed {
            return Ok(false);
        }
        self.fill()?;
        Ok(self.pos < self.filled)
    }

    fn read_byte(&mut self) -> Result<u8> {
        if !self.bytes_available()? {
            return Err(if self.closed {
                TransportError::Closed
            } else {
                TransportError::Empty
            });
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    fn is_closed(&self) -> bool {
        self.closed && self.pos >= self.filled
    }
}

impl<T: Write> ByteSink for StreamLink<T> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}
