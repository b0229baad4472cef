use bytes::BytesMut;
use omlink_transport::ByteSink;
use tracing::{debug, warn};

use crate::codec::{encode_frame, FrameConfig, MAX_FRAME_SIZE};
use crate::error::{FrameError, Result};

/// Reject payloads the configured length bounds cannot carry.
pub(crate) fn check_payload(config: &FrameConfig, payload: &[u8]) -> Result<()> {
    let max = config.max_payload();
    if payload.len() > max {
        warn!(size = payload.len(), max, "refusing to transmit oversized payload");
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max,
        });
    }
    Ok(())
}

/// Sends frames through a [`ByteSink`] transport.
///
/// Holds no protocol state beyond a scratch buffer; each call emits one
/// complete frame or nothing at all.
pub struct FrameTransmitter<T> {
    sink: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: ByteSink> FrameTransmitter<T> {
    /// Create a transmitter with default configuration.
    pub fn new(sink: T) -> Self {
        Self::with_config(sink, FrameConfig::default())
    }

    /// Create a transmitter with explicit configuration.
    pub fn with_config(sink: T, config: FrameConfig) -> Self {
        Self {
            sink,
            buf: BytesMut::with_capacity(MAX_FRAME_SIZE),
            config: config.normalized(),
        }
    }

    /// Frame `payload` and write it to the transport.
    ///
    /// An oversized payload is rejected before any byte reaches the sink.
    pub fn transmit(&mut self, payload: &[u8]) -> Result<()> {
        check_payload(&self.config, payload)?;

        self.buf.clear();
        encode_frame(payload, &mut self.buf)?;
        debug!(len = payload.len(), "transmitting frame");

        self.sink.write_bytes(&self.buf)?;
        self.sink.flush()?;
        Ok(())
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.sink
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.sink
    }

    /// Consume the transmitter and return the transport.
    pub fn into_inner(self) -> T {
        self.sink
    }

    /// Current transmitter configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
