use omlink_transport::TransportError;

/// Errors that can occur during frame reception or transmission.
///
/// Every receive-side variant is recoverable: the receiver has already
/// dropped the in-flight frame and is waiting for a fresh header when one of
/// these is returned.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The byte after the first sentinel was not the second sentinel.
    #[error("framing error: expected 0x55 after 0xAA, found 0x{found:02X}")]
    Framing { found: u8 },

    /// The declared length is outside the configured bounds.
    #[error("length {length} out of range [{min}, {max}]")]
    LengthOutOfRange { length: u8, min: u8, max: u8 },

    /// The received checksum does not match the computed one.
    #[error("checksum mismatch (computed 0x{computed:02X}, received 0x{received:02X})")]
    ChecksumMismatch { computed: u8, received: u8 },

    /// A partial frame sat idle longer than the configured budget.
    #[error("partial frame discarded after {idle_ms} ms without data")]
    Stale { idle_ms: u64 },

    /// The payload exceeds the maximum a single frame can carry.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The transport refused the frame bytes.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// An I/O error occurred while writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
