use std::time::Duration;

use omlink_frame::FrameConfig;
use omlink_proto::hexdump::DEFAULT_WIDTH;

/// Configuration for a [`ModuleLink`](crate::ModuleLink).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Receiver length bounds and staleness budget.
    pub frame: FrameConfig,
    /// Bytes per line when dumping relayed payloads.
    pub hex_dump_width: usize,
    /// Sleep between transport polls while waiting for a response.
    pub poll_interval: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            hex_dump_width: DEFAULT_WIDTH,
            poll_interval: Duration::from_millis(1),
        }
    }
}
