//! `tokio_util::codec` adapter (feature `async`).

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::codec::{encode_frame, FrameConfig};
use crate::error::FrameError;
use crate::receiver::{FrameReceiver, ReceiverStats};
use crate::writer::check_payload;

/// Frame codec for `FramedRead`/`FramedWrite` over an async byte stream.
///
/// Decoding runs the same byte-wise [`FrameReceiver`], so a corrupt frame
/// never terminates the stream: errors are counted in
/// [`stats`](OmFrameCodec::stats) and decoding carries on with the next byte.
#[derive(Debug, Default)]
pub struct OmFrameCodec {
    receiver: FrameReceiver,
}

impl OmFrameCodec {
    /// Create a codec with explicit configuration.
    pub fn new(config: FrameConfig) -> Self {
        Self {
            receiver: FrameReceiver::new(config),
        }
    }

    /// Receiver counters.
    pub fn stats(&self) -> ReceiverStats {
        self.receiver.stats()
    }
}

impl Decoder for OmFrameCodec {
    type Item = Bytes;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while src.has_remaining() {
            let byte = src.get_u8();
            match self.receiver.on_byte(byte) {
                Ok(Some(payload)) => return Ok(Some(payload)),
                Ok(None) => {}
                Err(err) => trace!(%err, "frame dropped by codec"),
            }
        }
        Ok(None)
    }
}

impl Encoder<&[u8]> for OmFrameCodec {
    type Error = FrameError;

    fn encode(&mut self, payload: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        check_payload(self.receiver.config(), payload)?;
        encode_frame(payload, dst)
    }
}

impl Encoder<Bytes> for OmFrameCodec {
    type Error = FrameError;

    fn encode(&mut self, payload: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<&[u8]>::encode(self, &payload[..], dst)
    }
}
