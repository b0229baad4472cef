/// Errors that can occur on a byte transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the named device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A read was requested while no byte was available.
    #[error("no byte available")]
    Empty,

    /// The peer closed the stream (EOF or zero-length write).
    #[error("transport closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
