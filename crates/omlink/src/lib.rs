//! Host-side protocol engine for BLE radio modules on a serial link.
//!
//! The module speaks a small framed protocol: sentinel bytes, a length, a
//! payload and a CRC-8. Payloads carry a closed catalog of commands,
//! responses and events. This crate bundles the layers:
//!
//! - [`transport`]: byte source/sink interfaces, loopback, stream adapter and
//!   serial port backend (behind `serial` feature)
//! - [`frame`]: checksum, frame receiver and transmitter
//! - [`proto`]: message catalog, decoders, dispatcher and command builders
//! - [`module`]: the per-connection engine tying them together
//!
//! The `omlink` binary (feature `cli`) decodes captures, encodes commands and
//! talks to a module on a serial port.

/// Re-export transport types.
pub mod transport {
    pub use omlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use omlink_frame::*;
}

/// Re-export protocol types.
pub mod proto {
    pub use omlink_proto::*;
}

/// Re-export link engine types.
pub mod module {
    pub use omlink_module::*;
}

pub use omlink_module::{LinkConfig, ModuleLink};
pub use omlink_proto::{dispatch, Command, Event, Message, Response};
