use std::collections::VecDeque;

use crate::error::{Result, TransportError};
use crate::traits::{ByteSink, ByteSource};

/// In-memory transport.
///
/// Bytes queued with [`push_rx`](Loopback::push_rx) are served by the
/// [`ByteSource`] half; everything written through [`ByteSink`] is captured
/// and can be taken with [`take_tx`](Loopback::take_tx). In echo mode written
/// bytes are also queued for reading, which wires a transmitter straight back
/// into a receiver.
#[derive(Debug, Default)]
pub struct Loopback {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    echo: bool,
    closed: bool,
}

impl Loopback {
    /// An empty loopback with separate rx and tx queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// A loopback whose writes are readable back.
    pub fn echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Loopback preloaded with inbound bytes.
    pub fn with_rx(bytes: impl AsRef<[u8]>) -> Self {
        let mut link = Self::new();
        link.push_rx(bytes);
        link
    }

    /// Queue inbound bytes.
    pub fn push_rx(&mut self, bytes: impl AsRef<[u8]>) {
        self.rx.extend(bytes.as_ref().iter().copied());
    }

    /// Number of inbound bytes not yet read.
    pub fn rx_len(&self) -> usize {
        self.rx.len()
    }

    /// Bytes written so far.
    pub fn tx(&self) -> &[u8] {
        &self.tx
    }

    /// Mark the inbound side as finished; once the queued bytes are read
    /// the source reports itself closed.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Take and clear the bytes written so far.
    pub fn take_tx(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }
}

impl ByteSource for Loopback {
    fn bytes_available(&mut self) -> Result<bool> {
        Ok(!self.rx.is_empty())
    }

    fn read_byte(&mut self) -> Result<u8> {
        match self.rx.pop_front() {
            Some(byte) => Ok(byte),
            None if self.closed => Err(TransportError::Closed),
            None => Err(TransportError::Empty),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed && self.rx.is_empty()
    }
}

impl ByteSink for Loopback {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.tx.extend_from_slice(bytes);
        if self.echo {
            self.rx.extend(bytes.iter().copied());
        }
        Ok(())
    }
}
