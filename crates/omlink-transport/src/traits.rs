use crate::error::Result;

/// The receive half of a transport.
///
/// Callers poll [`bytes_available`](ByteSource::bytes_available) and only call
/// [`read_byte`](ByteSource::read_byte) when it returned `true`. Neither call
/// should block for longer than the transport's own read timeout.
pub trait ByteSource {
    /// Whether at least one byte can be read right now.
    fn bytes_available(&mut self) -> Result<bool>;

    /// Take the next byte. Returns [`TransportError::Empty`](crate::TransportError::Empty)
    /// if nothing is buffered.
    fn read_byte(&mut self) -> Result<u8>;

    /// Whether the source has reached end of stream and will never produce
    /// another byte.
    fn is_closed(&self) -> bool {
        false
    }
}

/// The transmit half of a transport.
pub trait ByteSink {
    /// Write every byte or fail.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Push buffered bytes to the device.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn bytes_available(&mut self) -> Result<bool> {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl ByteSink for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}
