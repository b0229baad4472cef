//! Byte transport collaborators for the omlink protocol engine.
//!
//! The engine never opens ports or waits for data itself. It consumes two
//! small interfaces defined here:
//! - [`ByteSource`]: "is a byte available" and "read one byte"
//! - [`ByteSink`]: "write these bytes"
//!
//! Implementations provided:
//! - [`StreamLink`] over any `Read + Write` stream (files, sockets, serial ports)
//! - [`Loopback`], an in-memory transport for tests and offline decoding
//! - [`serial::open`] (feature `serial`) for a real UART at the module's baud rate

pub mod error;
pub mod loopback;
pub mod stream;
pub mod traits;

#[cfg(feature = "serial")]
pub mod serial;

pub use error::{Result, TransportError};
pub use loopback::Loopback;
pub use stream::StreamLink;
pub use traits::{ByteSink, ByteSource};
