use std::time::Duration;

/// Errors returned by [`ModuleLink`](crate::ModuleLink) operations.
///
/// Corrupt frames and undecodable payloads are not errors at this level:
/// they are counted, logged and reported to the line sink, and the link
/// keeps running.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] omlink_transport::TransportError),

    /// Frame-level error while transmitting.
    #[error("frame error: {0}")]
    Frame(#[from] omlink_frame::FrameError),

    /// The command could not be encoded.
    #[error("command error: {0}")]
    Command(#[from] omlink_proto::CommandError),

    /// No matching response arrived in time.
    #[error("no response after {0:?}")]
    Timeout(Duration),

    /// The transport reached end of stream.
    #[error("link closed: {0}")]
    Disconnected(String),
}

pub type Result<T> = std::result::Result<T, LinkError>;
