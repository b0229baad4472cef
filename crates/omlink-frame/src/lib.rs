//! Frame layer of the omlink serial protocol.
//!
//! Every message between host and radio module travels in a frame:
//! - two sentinel bytes (`0xAA 0x55`) for stream synchronization
//! - a 1-byte length (payload bytes + 1 checksum byte)
//! - the payload
//! - a CRC-8 (polynomial 0x07) over everything before it
//!
//! [`FrameReceiver`] rebuilds frames one byte at a time and resynchronizes on
//! any corruption; [`FrameTransmitter`] emits them.

pub mod codec;
pub mod crc;
pub mod error;
pub mod receiver;
pub mod writer;

#[cfg(feature = "async")]
pub mod stream_codec;

pub use codec::{
    encode_frame, frame_len, FrameConfig, HEADER1, HEADER2, HEADER_SIZE, LEN_MAX, LEN_MIN,
    MAX_FRAME_SIZE, MAX_PAYLOAD,
};
pub use crc::crc8;
pub use error::{FrameError, Result};
pub use receiver::{FrameReceiver, ReceiverState, ReceiverStats};
pub use writer::FrameTransmitter;

#[cfg(feature = "async")]
pub use stream_codec::OmFrameCodec;
