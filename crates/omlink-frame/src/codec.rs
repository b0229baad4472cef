use std::time::Duration;

use bytes::{BufMut, BytesMut};

use crate::crc::crc8;
use crate::error::{FrameError, Result};

/// First sentinel byte.
pub const HEADER1: u8 = 0xAA;

/// Second sentinel byte.
pub const HEADER2: u8 = 0x55;

/// Frame header: sentinel (2) + length (1) = 3 bytes.
pub const HEADER_SIZE: usize = 3;

/// Smallest legal length byte: an empty payload plus its checksum.
pub const LEN_MIN: u8 = 1;

/// Largest legal length byte.
pub const LEN_MAX: u8 = u8::MAX;

/// Largest payload a frame can carry.
pub const MAX_PAYLOAD: usize = LEN_MAX as usize - 1;

/// Largest complete frame on the wire, header and checksum included.
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + LEN_MAX as usize;

/// Wire size of a frame carrying `payload_len` bytes.
pub const fn frame_len(payload_len: usize) -> usize {
    HEADER_SIZE + payload_len + 1
}

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────┬──────┬──────────┬──────────────────┬──────────┐
/// │ 0xAA │ 0x55 │ Length   │ Payload          │ CRC-8    │
/// │      │      │ (n + 1)  │ (n bytes)        │ (1B)     │
/// └──────┴──────┴──────────┴──────────────────┴──────────┘
/// ```
///
/// The checksum covers every byte before it. Nothing is appended to `dst`
/// when the payload is too large.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }

    let header = [HEADER1, HEADER2, payload.len() as u8 + 1];
    let crc = crc8(crc8(0, &header), payload);

    dst.reserve(frame_len(payload.len()));
    dst.put_slice(&header);
    dst.put_slice(payload);
    dst.put_u8(crc);
    Ok(())
}

/// Configuration for frame reception and transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameConfig {
    /// Smallest accepted length byte. Default: 1.
    pub min_length: u8,
    /// Largest accepted length byte. Default: 255.
    pub max_length: u8,
    /// Discard a partial frame when no byte arrived for this long.
    /// Only consulted by [`FrameReceiver::on_byte_at`](crate::FrameReceiver::on_byte_at).
    /// Default: `None` (wait forever).
    pub stale_after: Option<Duration>,
}

impl FrameConfig {
    /// Copy of this config with the length bounds clamped so that
    /// `1 <= min_length <= max_length <= 255`.
    pub fn normalized(&self) -> Self {
        let min_length = self.min_length.max(LEN_MIN);
        let max_length = self.max_length.max(min_length);
        Self {
            min_length,
            max_length,
            stale_after: self.stale_after,
        }
    }

    /// Largest payload accepted under this config.
    pub fn max_payload(&self) -> usize {
        self.normalized().max_length as usize - 1
    }

    /// Smallest payload accepted under this config.
    pub fn min_payload(&self) -> usize {
        self.normalized().min_length as usize - 1
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            min_length: LEN_MIN,
            max_length: LEN_MAX,
            stale_after: None,
        }
    }
}
