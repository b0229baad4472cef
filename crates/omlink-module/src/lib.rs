//! Host-side engine for one omlink serial connection.
//!
//! [`ModuleLink`] ties the layers together: it pulls bytes from a transport,
//! rebuilds frames, dispatches payloads and writes one tagged, timestamped
//! line per outcome to a [`LineSink`]. Outbound commands go through the same
//! link so that a response can be awaited on the connection that sent the
//! command.

pub mod clock;
pub mod config;
pub mod error;
pub mod link;
pub mod sink;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::LinkConfig;
pub use error::{LinkError, Result};
pub use link::{LinkStats, ModuleLink};
pub use sink::{Line, LineSink, LineTag, MemorySink, TracingSink};
